//! RTC 设备驱动模块

use chrono::NaiveDateTime;

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// RTC 设备驱动接口
///
/// 时间按墙上时钟存储，不带时区。
pub trait RtcDriver: Driver {
    /// 读取当前日期时间
    fn datetime(&self) -> NaiveDateTime;

    /// 设置日期时间
    fn set_datetime(&self, datetime: &NaiveDateTime);

    /// 读取自纪元以来的秒数（把墙上时钟当作 UTC）
    fn epoch(&self) -> i64 {
        self.datetime().and_utc().timestamp()
    }
}

impl DeviceContext {
    /// 读取当前日期时间
    pub fn rtc_get_datetime(&self, handle: Handle) -> NaiveDateTime {
        expect_driver!(self, handle, Rtc).datetime()
    }

    /// 设置日期时间
    pub fn rtc_set_datetime(&self, handle: Handle, datetime: &NaiveDateTime) {
        expect_driver!(self, handle, Rtc).set_datetime(datetime);
    }
}
