//! 内部宏

/// 对 [`DriverInstance`](crate::DriverInstance) 的每个变体执行同一段代码，
/// 变体内的驱动以 `$d` 绑定（类型为 `&Arc<dyn XxxDriver>`）。
macro_rules! for_each_driver {
    ($inst:expr, $d:ident => $body:expr) => {
        match $inst {
            $crate::driver::DriverInstance::Uart($d) => $body,
            $crate::driver::DriverInstance::Gpio($d) => $body,
            $crate::driver::DriverInstance::I2c($d) => $body,
            $crate::driver::DriverInstance::I2cDevice($d) => $body,
            $crate::driver::DriverInstance::I2s($d) => $body,
            $crate::driver::DriverInstance::Spi($d) => $body,
            $crate::driver::DriverInstance::SpiDevice($d) => $body,
            $crate::driver::DriverInstance::Dvp($d) => $body,
            $crate::driver::DriverInstance::Sccb($d) => $body,
            $crate::driver::DriverInstance::SccbDevice($d) => $body,
            $crate::driver::DriverInstance::Fft($d) => $body,
            $crate::driver::DriverInstance::Aes($d) => $body,
            $crate::driver::DriverInstance::Sha256($d) => $body,
            $crate::driver::DriverInstance::Timer($d) => $body,
            $crate::driver::DriverInstance::Pwm($d) => $body,
            $crate::driver::DriverInstance::Wdt($d) => $body,
            $crate::driver::DriverInstance::Rtc($d) => $body,
            $crate::driver::DriverInstance::Pic($d) => $body,
            $crate::driver::DriverInstance::Dmac($d) => $body,
            $crate::driver::DriverInstance::Dma($d) => $body,
            $crate::driver::DriverInstance::BlockStorage($d) => $body,
            $crate::driver::DriverInstance::File($d) => $body,
            $crate::driver::DriverInstance::Custom($d) => $body,
        }
    };
}

/// 类型化接口的入口：解析句柄并断言其设备类别。
///
/// 句柄无效或类别不符都是调用方的编程错误，直接 panic。
macro_rules! expect_driver {
    ($ctx:expr, $handle:expr, $variant:ident) => {{
        let handle: $crate::handle::Handle = $handle;
        let file = $ctx.expect_file(handle);
        match file.driver() {
            $crate::driver::DriverInstance::$variant(driver) => driver.clone(),
            other => panic!(
                "device: handle {} refers to a {:?} driver, expected {:?}",
                handle,
                other.driver_type(),
                $crate::driver::DriverType::$variant
            ),
        }
    }};
}
