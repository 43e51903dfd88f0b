//! I2C 控制器与从设备
//!
//! 控制器通过 [`DeviceContext::i2c_get_device`] 派生出总线上的从设备，
//! 从设备以 `I2cDevice` 类别装入 custom 表，打开后获得句柄。

use alloc::sync::Arc;

use crate::context::DeviceContext;
use crate::driver::{Driver, DriverInstance};
use crate::error::DeviceError;
use crate::handle::Handle;

/// 总线速率模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cBusSpeed {
    /// 100 kbit/s
    Standard,
    /// 400 kbit/s
    Fast,
    /// 3.4 Mbit/s
    HighSpeed,
}

/// 从机模式下的总线事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cEvent {
    /// 起始条件
    Start,
    /// 重复起始
    Restart,
    /// 停止条件
    Stop,
}

/// 从机模式回调，在中断上下文中调用
pub trait I2cSlaveHandler: Send + Sync {
    /// 主机写入一个数据
    fn on_receive(&self, data: u32);

    /// 主机读取，返回要发送的数据
    fn on_transmit(&self) -> u32;

    /// 总线事件
    fn on_event(&self, event: I2cEvent);
}

/// I2C 从设备驱动程序特征
pub trait I2cDeviceDriver: Driver {
    /// 设置时钟频率，返回实际生效的频率
    fn set_clock_rate(&self, clock_rate: f64) -> f64;

    /// 从设备读取，返回读取的字节数
    fn read(&self, buf: &mut [u8]) -> usize;

    /// 向设备写入，返回写入的字节数
    fn write(&self, buf: &[u8]) -> usize;

    /// 先写后读，返回读取的字节数
    fn transfer_sequential(&self, write: &[u8], read: &mut [u8]) -> usize;
}

/// I2C 控制器驱动程序特征
pub trait I2cDriver: Driver {
    /// 创建总线上的从设备
    fn get_device(
        &self,
        slave_address: u32,
        address_width: u32,
        bus_speed: I2cBusSpeed,
    ) -> Arc<dyn I2cDeviceDriver>;

    /// 把控制器配置为从机
    fn config_as_slave(
        &self,
        slave_address: u32,
        address_width: u32,
        bus_speed: I2cBusSpeed,
        handler: Arc<dyn I2cSlaveHandler>,
    );
}

impl DeviceContext {
    /// 在 I2C 控制器上创建名为 `name` 的从设备，打开它并返回句柄
    ///
    /// 从设备只创建一次。关闭句柄后它仍留在 custom 表中，用
    /// [`DeviceContext::open`] 按名字再次打开。
    ///
    /// # Errors
    /// - [`DeviceError::AlreadyExists`]：名字已存在于 custom 表
    /// - [`DeviceError::Unavailable`]：从设备拒绝打开
    /// - [`DeviceError::TooManyHandles`]：句柄表已满
    pub fn i2c_get_device(
        &self,
        handle: Handle,
        name: &str,
        slave_address: u32,
        address_width: u32,
        bus_speed: I2cBusSpeed,
    ) -> Result<Handle, DeviceError> {
        let i2c = expect_driver!(self, handle, I2c);
        let device = i2c.get_device(slave_address, address_width, bus_speed);
        self.attach_device(name, DriverInstance::I2cDevice(device))
    }

    /// 把控制器配置为从机
    pub fn i2c_config_as_slave(
        &self,
        handle: Handle,
        slave_address: u32,
        address_width: u32,
        bus_speed: I2cBusSpeed,
        handler: Arc<dyn I2cSlaveHandler>,
    ) {
        expect_driver!(self, handle, I2c).config_as_slave(
            slave_address,
            address_width,
            bus_speed,
            handler,
        );
    }

    /// 设置从设备时钟频率
    pub fn i2c_dev_set_clock_rate(&self, handle: Handle, clock_rate: f64) -> f64 {
        expect_driver!(self, handle, I2cDevice).set_clock_rate(clock_rate)
    }

    /// 先写后读
    pub fn i2c_dev_transfer_sequential(
        &self,
        handle: Handle,
        write: &[u8],
        read: &mut [u8],
    ) -> usize {
        expect_driver!(self, handle, I2cDevice).transfer_sequential(write, read)
    }
}
