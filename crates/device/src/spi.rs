//! SPI 控制器与从设备

use alloc::sync::Arc;

use crate::context::DeviceContext;
use crate::driver::{Driver, DriverInstance};
use crate::error::DeviceError;
use crate::handle::Handle;

/// 时钟极性与相位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// 数据线宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiFrameFormat {
    /// 单线
    Standard,
    /// 双线
    Dual,
    /// 四线
    Quad,
    /// 八线
    Octal,
}

/// 非标准帧中指令和地址的传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiInstAddrTransMode {
    /// 指令和地址都按标准单线发送
    Standard,
    /// 指令单线，地址按帧格式
    AddrStandard,
    /// 指令和地址都按帧格式
    AsFrameFormat,
}

/// SPI 从设备驱动程序特征
pub trait SpiDeviceDriver: Driver {
    /// 配置非标准帧（多线模式下的指令、地址长度和等待周期）
    fn config_non_standard(
        &self,
        instruction_length: u32,
        address_length: u32,
        wait_cycles: u32,
        trans_mode: SpiInstAddrTransMode,
    );

    /// 设置时钟频率，返回实际生效的频率
    fn set_clock_rate(&self, clock_rate: f64) -> f64;

    /// 读取，返回读取的字节数
    fn read(&self, buf: &mut [u8]) -> usize;

    /// 写入，返回写入的字节数
    fn write(&self, buf: &[u8]) -> usize;

    /// 全双工传输，返回读取的字节数
    fn transfer_full_duplex(&self, write: &[u8], read: &mut [u8]) -> usize;

    /// 先写后读，返回读取的字节数
    fn transfer_sequential(&self, write: &[u8], read: &mut [u8]) -> usize;

    /// 以同一个值重复填充 `count` 次
    fn fill(&self, instruction: u32, address: u32, value: u32, count: usize);
}

/// SPI 控制器驱动程序特征
pub trait SpiDriver: Driver {
    /// 创建总线上的从设备
    fn get_device(
        &self,
        mode: SpiMode,
        frame_format: SpiFrameFormat,
        chip_select_mask: u32,
        data_bit_length: u32,
    ) -> Arc<dyn SpiDeviceDriver>;
}

impl DeviceContext {
    /// 在 SPI 控制器上创建名为 `name` 的从设备并返回其句柄
    ///
    /// # Errors
    /// 同 [`DeviceContext::i2c_get_device`]。
    pub fn spi_get_device(
        &self,
        handle: Handle,
        name: &str,
        mode: SpiMode,
        frame_format: SpiFrameFormat,
        chip_select_mask: u32,
        data_bit_length: u32,
    ) -> Result<Handle, DeviceError> {
        let spi = expect_driver!(self, handle, Spi);
        let device = spi.get_device(mode, frame_format, chip_select_mask, data_bit_length);
        self.attach_device(name, DriverInstance::SpiDevice(device))
    }

    /// 配置非标准帧
    pub fn spi_dev_config_non_standard(
        &self,
        handle: Handle,
        instruction_length: u32,
        address_length: u32,
        wait_cycles: u32,
        trans_mode: SpiInstAddrTransMode,
    ) {
        expect_driver!(self, handle, SpiDevice).config_non_standard(
            instruction_length,
            address_length,
            wait_cycles,
            trans_mode,
        );
    }

    /// 设置时钟频率
    pub fn spi_dev_set_clock_rate(&self, handle: Handle, clock_rate: f64) -> f64 {
        expect_driver!(self, handle, SpiDevice).set_clock_rate(clock_rate)
    }

    /// 全双工传输
    pub fn spi_dev_transfer_full_duplex(
        &self,
        handle: Handle,
        write: &[u8],
        read: &mut [u8],
    ) -> usize {
        expect_driver!(self, handle, SpiDevice).transfer_full_duplex(write, read)
    }

    /// 先写后读
    pub fn spi_dev_transfer_sequential(
        &self,
        handle: Handle,
        write: &[u8],
        read: &mut [u8],
    ) -> usize {
        expect_driver!(self, handle, SpiDevice).transfer_sequential(write, read)
    }

    /// 重复填充
    pub fn spi_dev_fill(
        &self,
        handle: Handle,
        instruction: u32,
        address: u32,
        value: u32,
        count: usize,
    ) {
        expect_driver!(self, handle, SpiDevice).fill(instruction, address, value, count);
    }
}
