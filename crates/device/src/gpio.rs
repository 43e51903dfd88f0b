//! GPIO 设备类别

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 引脚驱动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDriveMode {
    /// 输入
    Input,
    /// 输入，下拉
    InputPullDown,
    /// 输入，上拉
    InputPullUp,
    /// 推挽输出
    Output,
}

/// 触发中断的边沿
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioPinEdge {
    /// 不触发
    None,
    /// 下降沿
    Falling,
    /// 上升沿
    Rising,
    /// 双边沿
    Both,
}

/// 引脚电平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioPinValue {
    /// 低
    Low,
    /// 高
    High,
}

/// 电平变化回调，参数为引脚号和注册时的 userdata
///
/// 在中断上下文中调用。
pub type GpioOnChanged = fn(pin: u32, userdata: usize);

/// GPIO 驱动程序特征
pub trait GpioDriver: Driver {
    /// 引脚数量
    fn pin_count(&self) -> u32;

    /// 设置驱动模式
    fn set_drive_mode(&self, pin: u32, mode: GpioDriveMode);

    /// 设置触发边沿
    fn set_pin_edge(&self, pin: u32, edge: GpioPinEdge);

    /// 设置电平变化回调，`None` 表示清除
    fn set_on_changed(&self, pin: u32, callback: Option<GpioOnChanged>, userdata: usize);

    /// 读取电平
    fn pin_value(&self, pin: u32) -> GpioPinValue;

    /// 输出电平
    fn set_pin_value(&self, pin: u32, value: GpioPinValue);
}

impl DeviceContext {
    /// 引脚数量
    pub fn gpio_pin_count(&self, handle: Handle) -> u32 {
        expect_driver!(self, handle, Gpio).pin_count()
    }

    /// 设置驱动模式
    pub fn gpio_set_drive_mode(&self, handle: Handle, pin: u32, mode: GpioDriveMode) {
        expect_driver!(self, handle, Gpio).set_drive_mode(pin, mode);
    }

    /// 设置触发边沿
    pub fn gpio_set_pin_edge(&self, handle: Handle, pin: u32, edge: GpioPinEdge) {
        expect_driver!(self, handle, Gpio).set_pin_edge(pin, edge);
    }

    /// 设置电平变化回调
    pub fn gpio_set_on_changed(
        &self,
        handle: Handle,
        pin: u32,
        callback: Option<GpioOnChanged>,
        userdata: usize,
    ) {
        expect_driver!(self, handle, Gpio).set_on_changed(pin, callback, userdata);
    }

    /// 读取电平
    pub fn gpio_get_pin_value(&self, handle: Handle, pin: u32) -> GpioPinValue {
        expect_driver!(self, handle, Gpio).pin_value(pin)
    }

    /// 输出电平
    pub fn gpio_set_pin_value(&self, handle: Handle, pin: u32, value: GpioPinValue) {
        expect_driver!(self, handle, Gpio).set_pin_value(pin, value);
    }
}
