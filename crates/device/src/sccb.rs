//! SCCB（摄像头配置总线）控制器与从设备

use alloc::sync::Arc;

use crate::context::DeviceContext;
use crate::driver::{Driver, DriverInstance};
use crate::error::DeviceError;
use crate::handle::Handle;

/// SCCB 从设备驱动程序特征
pub trait SccbDeviceDriver: Driver {
    /// 读一个寄存器
    fn read_byte(&self, reg_address: u16) -> u8;

    /// 写一个寄存器
    fn write_byte(&self, reg_address: u16, value: u8);
}

/// SCCB 控制器驱动程序特征
pub trait SccbDriver: Driver {
    /// 创建总线上的从设备
    fn get_device(&self, slave_address: u32, reg_address_width: u32) -> Arc<dyn SccbDeviceDriver>;
}

impl DeviceContext {
    /// 在 SCCB 控制器上创建名为 `name` 的从设备并返回其句柄
    ///
    /// # Errors
    /// 同 [`DeviceContext::i2c_get_device`]。
    pub fn sccb_get_device(
        &self,
        handle: Handle,
        name: &str,
        slave_address: u32,
        reg_address_width: u32,
    ) -> Result<Handle, DeviceError> {
        let sccb = expect_driver!(self, handle, Sccb);
        let device = sccb.get_device(slave_address, reg_address_width);
        self.attach_device(name, DriverInstance::SccbDevice(device))
    }

    /// 读一个寄存器
    pub fn sccb_dev_read_byte(&self, handle: Handle, reg_address: u16) -> u8 {
        expect_driver!(self, handle, SccbDevice).read_byte(reg_address)
    }

    /// 写一个寄存器
    pub fn sccb_dev_write_byte(&self, handle: Handle, reg_address: u16, value: u8) {
        expect_driver!(self, handle, SccbDevice).write_byte(reg_address, value);
    }
}
