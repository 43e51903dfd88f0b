//! PWM 设备类别

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// PWM 驱动程序特征
pub trait PwmDriver: Driver {
    /// 通道数量
    fn pin_count(&self) -> u32;

    /// 设置频率，返回实际生效的频率
    fn set_frequency(&self, frequency: f64) -> f64;

    /// 设置占空比（0.0 到 1.0），返回实际生效的占空比
    fn set_active_duty_cycle_percentage(&self, pin: u32, duty_cycle_percentage: f64) -> f64;

    /// 启用或停止一个通道
    fn set_enable(&self, pin: u32, enable: bool);
}

impl DeviceContext {
    /// 通道数量
    pub fn pwm_pin_count(&self, handle: Handle) -> u32 {
        expect_driver!(self, handle, Pwm).pin_count()
    }

    /// 设置频率
    pub fn pwm_set_frequency(&self, handle: Handle, frequency: f64) -> f64 {
        expect_driver!(self, handle, Pwm).set_frequency(frequency)
    }

    /// 设置占空比
    pub fn pwm_set_active_duty_cycle_percentage(
        &self,
        handle: Handle,
        pin: u32,
        duty_cycle_percentage: f64,
    ) -> f64 {
        expect_driver!(self, handle, Pwm)
            .set_active_duty_cycle_percentage(pin, duty_cycle_percentage)
    }

    /// 启用或停止一个通道
    pub fn pwm_set_enable(&self, handle: Handle, pin: u32, enable: bool) {
        expect_driver!(self, handle, Pwm).set_enable(pin, enable);
    }
}
