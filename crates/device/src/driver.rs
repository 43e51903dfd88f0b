//! 设备驱动基础类型
//!
//! 包含 Driver trait、DriverType 枚举和以类别为标签的 DriverInstance

use alloc::sync::Arc;
use core::fmt;

use crate::accel::{AesDriver, FftDriver, Sha256Driver};
use crate::block::BlockStorageDriver;
use crate::custom::{CustomDriver, FileDriver};
use crate::dma::{DmaDriver, DmacDriver};
use crate::dvp::DvpDriver;
use crate::gpio::GpioDriver;
use crate::i2c::{I2cDeviceDriver, I2cDriver};
use crate::i2s::I2sDriver;
use crate::pic::PicDriver;
use crate::pwm::PwmDriver;
use crate::rtc::RtcDriver;
use crate::sccb::{SccbDeviceDriver, SccbDriver};
use crate::serial::UartDriver;
use crate::spi::{SpiDeviceDriver, SpiDriver};
use crate::timer::TimerDriver;
use crate::wdt::WdtDriver;

/// 设备类别枚举
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DriverType {
    /// 串口
    Uart,
    /// 通用 IO
    Gpio,
    /// I2C 控制器
    I2c,
    /// I2C 总线上的从设备
    I2cDevice,
    /// I2S 音频接口
    I2s,
    /// SPI 控制器
    Spi,
    /// SPI 总线上的从设备
    SpiDevice,
    /// 摄像头接口
    Dvp,
    /// SCCB 控制器
    Sccb,
    /// SCCB 总线上的从设备
    SccbDevice,
    /// FFT 加速器
    Fft,
    /// AES 加速器
    Aes,
    /// SHA256 加速器
    Sha256,
    /// 定时器
    Timer,
    /// PWM
    Pwm,
    /// 看门狗
    Wdt,
    /// 实时时钟
    Rtc,
    /// 中断控制器
    Pic,
    /// DMA 控制器
    Dmac,
    /// DMA 通道
    Dma,
    /// 块存储
    BlockStorage,
    /// 文件
    File,
    /// 自定义驱动
    Custom,
}

/// 设备驱动程序特征
///
/// 每个类别的能力 trait 都以它为父 trait。
pub trait Driver: Send + Sync {
    /// 安装驱动，启动阶段调用一次
    fn install(&self);

    /// 打开设备
    ///
    /// 返回 false 表示设备当前不可用（例如独占设备已被打开），
    /// 此时不会为调用方分配句柄。
    fn open(&self) -> bool;

    /// 关闭设备，与一次成功的 [`Driver::open`] 配对
    fn close(&self);
}

/// 驱动实例，变体即其设备类别
///
/// 类别由变体决定，注册表项声明的类别不可能与实例的能力集不一致。
#[derive(Clone)]
pub enum DriverInstance {
    /// 串口
    Uart(Arc<dyn UartDriver>),
    /// 通用 IO
    Gpio(Arc<dyn GpioDriver>),
    /// I2C 控制器
    I2c(Arc<dyn I2cDriver>),
    /// I2C 从设备
    I2cDevice(Arc<dyn I2cDeviceDriver>),
    /// I2S 音频接口
    I2s(Arc<dyn I2sDriver>),
    /// SPI 控制器
    Spi(Arc<dyn SpiDriver>),
    /// SPI 从设备
    SpiDevice(Arc<dyn SpiDeviceDriver>),
    /// 摄像头接口
    Dvp(Arc<dyn DvpDriver>),
    /// SCCB 控制器
    Sccb(Arc<dyn SccbDriver>),
    /// SCCB 从设备
    SccbDevice(Arc<dyn SccbDeviceDriver>),
    /// FFT 加速器
    Fft(Arc<dyn FftDriver>),
    /// AES 加速器
    Aes(Arc<dyn AesDriver>),
    /// SHA256 加速器
    Sha256(Arc<dyn Sha256Driver>),
    /// 定时器
    Timer(Arc<dyn TimerDriver>),
    /// PWM
    Pwm(Arc<dyn PwmDriver>),
    /// 看门狗
    Wdt(Arc<dyn WdtDriver>),
    /// 实时时钟
    Rtc(Arc<dyn RtcDriver>),
    /// 中断控制器
    Pic(Arc<dyn PicDriver>),
    /// DMA 控制器
    Dmac(Arc<dyn DmacDriver>),
    /// DMA 通道
    Dma(Arc<dyn DmaDriver>),
    /// 块存储
    BlockStorage(Arc<dyn BlockStorageDriver>),
    /// 文件
    File(Arc<dyn FileDriver>),
    /// 自定义驱动
    Custom(Arc<dyn CustomDriver>),
}

impl DriverInstance {
    /// 返回实例的设备类别
    pub fn driver_type(&self) -> DriverType {
        match self {
            DriverInstance::Uart(_) => DriverType::Uart,
            DriverInstance::Gpio(_) => DriverType::Gpio,
            DriverInstance::I2c(_) => DriverType::I2c,
            DriverInstance::I2cDevice(_) => DriverType::I2cDevice,
            DriverInstance::I2s(_) => DriverType::I2s,
            DriverInstance::Spi(_) => DriverType::Spi,
            DriverInstance::SpiDevice(_) => DriverType::SpiDevice,
            DriverInstance::Dvp(_) => DriverType::Dvp,
            DriverInstance::Sccb(_) => DriverType::Sccb,
            DriverInstance::SccbDevice(_) => DriverType::SccbDevice,
            DriverInstance::Fft(_) => DriverType::Fft,
            DriverInstance::Aes(_) => DriverType::Aes,
            DriverInstance::Sha256(_) => DriverType::Sha256,
            DriverInstance::Timer(_) => DriverType::Timer,
            DriverInstance::Pwm(_) => DriverType::Pwm,
            DriverInstance::Wdt(_) => DriverType::Wdt,
            DriverInstance::Rtc(_) => DriverType::Rtc,
            DriverInstance::Pic(_) => DriverType::Pic,
            DriverInstance::Dmac(_) => DriverType::Dmac,
            DriverInstance::Dma(_) => DriverType::Dma,
            DriverInstance::BlockStorage(_) => DriverType::BlockStorage,
            DriverInstance::File(_) => DriverType::File,
            DriverInstance::Custom(_) => DriverType::Custom,
        }
    }

    /// 调用驱动的 [`Driver::install`]
    pub fn install(&self) {
        for_each_driver!(self, d => d.install())
    }

    /// 调用驱动的 [`Driver::open`]
    pub fn open(&self) -> bool {
        for_each_driver!(self, d => d.open())
    }

    /// 调用驱动的 [`Driver::close`]
    pub fn close(&self) {
        for_each_driver!(self, d => d.close())
    }
}

impl fmt::Debug for DriverInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DriverInstance")
            .field(&self.driver_type())
            .finish()
    }
}
