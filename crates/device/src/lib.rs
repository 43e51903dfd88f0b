//! HAL 设备驱动分发框架
//!
//! 此 crate 把各类外设统一到“按名字打开、按句柄访问”的模型下，包括：
//!
//! - [`Driver`] trait 与各设备类别的能力 trait（[`UartDriver`]、[`GpioDriver`]、[`DmaDriver`] 等）
//! - [`SharedAccess`] / [`ExclusiveAccess`] - 叶子驱动实现 `open`/`close` 的计数辅助
//! - [`DriverInstance`] - 以设备类别为标签的驱动实例
//! - [`RegistryTable`] / [`CustomTable`] - 静态与动态驱动注册表
//! - [`HandleTable`] - 无锁分配的句柄表
//! - [`DmaPool`] - 由计数信号量准入的 DMA 通道池
//! - [`PicTable`] - 按 IRQ 号索引的中断回调表
//! - [`DeviceContext`] - 持有以上全部状态的运行时上下文
//!
//! # 生命周期
//!
//! 启动时用 [`DeviceContextBuilder`] 填充 `hal`、`dma`、`system` 三张静态表，
//! 构建出 [`DeviceContext`] 后调用 [`init`] 安装为全局单例，再调用
//! [`DeviceContext::install`] 依次安装驱动。上下文不会被销毁。
//!
//! # 错误约定
//!
//! 可恢复的失败（名字不存在、设备忙、句柄耗尽、操作不支持）以 [`DeviceError`] 返回；
//! 调用方的编程错误（把 UART 句柄传给 GPIO 接口、无效句柄传给类型化接口、
//! 自定义驱动表溢出）直接 panic。

#![no_std]
#![allow(clippy::module_inception)]

extern crate alloc;
#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

pub mod accel;
pub mod access;
pub mod block;
pub mod config;
pub mod context;
pub mod custom;
pub mod dma;
pub mod driver;
pub mod dvp;
pub mod error;
pub mod gpio;
pub mod handle;
pub mod i2c;
pub mod i2s;
pub mod pic;
pub mod pwm;
pub mod registry;
pub mod rtc;
pub mod sccb;
pub mod serial;
pub mod spi;
pub mod timer;
pub mod wdt;

#[cfg(test)]
mod tests;

// Re-export driver
pub use driver::{Driver, DriverInstance, DriverType};

// Re-export error
pub use error::DeviceError;

// Re-export registry
pub use registry::{CustomTable, DriverRegistry, RegistryTable};

// Re-export handle
pub use handle::{FileObject, Handle, HandleTable};

// Re-export context
pub use context::{DeviceContext, DeviceContextBuilder, devices, init};

// Re-export access helpers
pub use access::{ExclusiveAccess, SharedAccess};

// Re-export device classes
pub use accel::{AesCipherMode, AesDriver, AesParameters, FftDirection, FftDriver, Sha256Driver};
pub use block::BlockStorageDriver;
pub use custom::{CustomDriver, FileDriver};
pub use dma::{
    DmaDriver, DmaFlags, DmaLoop, DmaPool, DmaStageCompletion, DmaTransfer, DmacDriver,
};
pub use dvp::{DvpDriver, DvpFrameEvent, DvpOnFrameEvent, DvpSignal, VideoFormat};
pub use gpio::{GpioDriveMode, GpioDriver, GpioOnChanged, GpioPinEdge, GpioPinValue};
pub use i2c::{I2cBusSpeed, I2cDeviceDriver, I2cDriver, I2cEvent, I2cSlaveHandler};
pub use i2s::{AudioFormat, I2sAlignMode, I2sBuffer, I2sDriver};
pub use pic::{IrqHandler, PicDriver, PicTable};
pub use pwm::PwmDriver;
pub use rtc::RtcDriver;
pub use sccb::{SccbDeviceDriver, SccbDriver};
pub use serial::{UartDriver, UartParity, UartStopBits};
pub use spi::{SpiDeviceDriver, SpiDriver, SpiFrameFormat, SpiInstAddrTransMode, SpiMode};
pub use timer::{TimerDriver, TimerOnTick};
pub use wdt::{WdtDriver, WdtOnTimeout, WdtResponseMode};
