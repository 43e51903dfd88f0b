//! 看门狗设备类别

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 超时后的响应方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WdtResponseMode {
    /// 直接复位
    Reset,
    /// 先中断，再次超时才复位
    Interrupt,
}

/// 超时回调，返回 true 表示已处理、重新计时
pub type WdtOnTimeout = fn(userdata: usize) -> bool;

/// 看门狗驱动程序特征
pub trait WdtDriver: Driver {
    /// 设置响应方式
    fn set_response_mode(&self, mode: WdtResponseMode);

    /// 设置超时（纳秒），返回实际生效的超时
    fn set_timeout(&self, nanoseconds: usize) -> usize;

    /// 设置超时回调，`None` 表示清除
    fn set_on_timeout(&self, handler: Option<WdtOnTimeout>, userdata: usize);

    /// 喂狗
    fn restart_counter(&self);

    /// 启用或停止
    fn set_enable(&self, enable: bool);
}

impl DeviceContext {
    /// 设置响应方式
    pub fn wdt_set_response_mode(&self, handle: Handle, mode: WdtResponseMode) {
        expect_driver!(self, handle, Wdt).set_response_mode(mode);
    }

    /// 设置超时
    pub fn wdt_set_timeout(&self, handle: Handle, nanoseconds: usize) -> usize {
        expect_driver!(self, handle, Wdt).set_timeout(nanoseconds)
    }

    /// 设置超时回调
    pub fn wdt_set_on_timeout(
        &self,
        handle: Handle,
        handler: Option<WdtOnTimeout>,
        userdata: usize,
    ) {
        expect_driver!(self, handle, Wdt).set_on_timeout(handler, userdata);
    }

    /// 喂狗
    pub fn wdt_restart_counter(&self, handle: Handle) {
        expect_driver!(self, handle, Wdt).restart_counter();
    }

    /// 启用或停止
    pub fn wdt_set_enable(&self, handle: Handle, enable: bool) {
        expect_driver!(self, handle, Wdt).set_enable(enable);
    }
}
