//! 定时器设备类别

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 定时回调，在中断上下文中调用
pub type TimerOnTick = fn(userdata: usize);

/// 定时器驱动程序特征
pub trait TimerDriver: Driver {
    /// 设置周期（纳秒），返回实际生效的周期
    fn set_interval(&self, nanoseconds: usize) -> usize;

    /// 设置定时回调，`None` 表示清除
    fn set_on_tick(&self, on_tick: Option<TimerOnTick>, userdata: usize);

    /// 启用或停止
    fn set_enable(&self, enable: bool);
}

impl DeviceContext {
    /// 设置周期
    pub fn timer_set_interval(&self, handle: Handle, nanoseconds: usize) -> usize {
        expect_driver!(self, handle, Timer).set_interval(nanoseconds)
    }

    /// 设置定时回调
    pub fn timer_set_on_tick(&self, handle: Handle, on_tick: Option<TimerOnTick>, userdata: usize) {
        expect_driver!(self, handle, Timer).set_on_tick(on_tick, userdata);
    }

    /// 启用或停止
    pub fn timer_set_enable(&self, handle: Handle, enable: bool) {
        expect_driver!(self, handle, Timer).set_enable(enable);
    }
}
