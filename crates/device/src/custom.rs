//! 自定义驱动与文件
//!
//! 自定义驱动只通过通用的 [`DeviceContext::control`](crate::DeviceContext::control) 访问；
//! 文件只通过通用的 `read`/`write` 访问。

use crate::driver::Driver;

/// 自定义驱动程序特征
pub trait CustomDriver: Driver {
    /// 执行控制命令，返回写入 `read` 的字节数
    fn control(&self, code: u32, write: &[u8], read: &mut [u8]) -> usize;
}

/// 文件驱动程序特征
pub trait FileDriver: Driver {
    /// 读取，返回读取的字节数
    fn read(&self, buf: &mut [u8]) -> usize;

    /// 写入，返回写入的字节数
    fn write(&self, buf: &[u8]) -> usize;
}
