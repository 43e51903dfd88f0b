//! 串口设备类别
//!
//! 通用 `read`/`write` 对 UART 句柄直接转发到驱动。

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 停止位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartStopBits {
    /// 1 位
    One,
    /// 1.5 位
    OneHalf,
    /// 2 位
    Two,
}

/// 校验方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartParity {
    /// 无校验
    None,
    /// 奇校验
    Odd,
    /// 偶校验
    Even,
}

/// 串口驱动程序特征
pub trait UartDriver: Driver {
    /// 配置波特率和帧格式
    fn config(&self, baud_rate: u32, data_width: u32, stop_bits: UartStopBits, parity: UartParity);

    /// 读取到 `buf`，返回实际读取的字节数
    fn read(&self, buf: &mut [u8]) -> usize;

    /// 写出 `buf`，返回实际写出的字节数
    fn write(&self, buf: &[u8]) -> usize;
}

impl DeviceContext {
    /// 配置串口
    ///
    /// # Panics
    /// 句柄无效或不是 UART 时 panic。
    pub fn uart_config(
        &self,
        handle: Handle,
        baud_rate: u32,
        data_width: u32,
        stop_bits: UartStopBits,
        parity: UartParity,
    ) {
        let uart = expect_driver!(self, handle, Uart);
        uart.config(baud_rate, data_width, stop_bits, parity);
    }
}
