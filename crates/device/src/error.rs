//! 设备层错误类型
//!
//! 只覆盖可恢复的失败，可通过 [`DeviceError::to_errno()`] 转换为错误码。
//! 调用方的契约违反（错误的设备类别、无效句柄传给类型化接口）直接 panic，不在此列。

/// 设备层错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 没有该名字的驱动 (-ENOENT)
    NotFound,
    /// 驱动存在但拒绝打开，例如已被独占 (-EBUSY)
    Unavailable,
    /// 句柄表已满 (-EMFILE)
    TooManyHandles,
    /// 句柄越界或对应槽位为空 (-EBADF)
    BadHandle,
    /// 该设备类别不支持此通用操作 (-ENOTSUP)
    NotSupported,
    /// 同一张表中已有同名驱动 (-EEXIST)
    AlreadyExists,
    /// DMA 信号量放行，但没有任何通道可以打开 (-EIO)
    DmaInconsistent,
    /// 非阻塞操作将阻塞 (-EAGAIN)
    WouldBlock,
}

impl DeviceError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            DeviceError::NotFound => -2,
            DeviceError::DmaInconsistent => -5,
            DeviceError::BadHandle => -9,
            DeviceError::WouldBlock => -11,
            DeviceError::Unavailable => -16,
            DeviceError::AlreadyExists => -17,
            DeviceError::TooManyHandles => -24,
            DeviceError::NotSupported => -95,
        }
    }
}
