//! DMA 通道池
//!
//! 计数信号量的初值等于 `dma` 表的通道数，借出的通道永远不会超过这个数。
//! 许可只决定“能不能借”，具体借哪个通道由按注册顺序调用 `open` 决定。

use alloc::sync::Arc;
use core::fmt;
use sync::Semaphore;

use crate::error::DeviceError;
use crate::registry::{DriverRegistry, RegistryTable};

/// DMA 通道池
pub struct DmaPool {
    channels: RegistryTable,
    free: Semaphore,
}

impl DmaPool {
    /// 以 `channels` 中的全部通道建池
    pub fn new(channels: RegistryTable) -> Self {
        let count = channels.len();
        Self {
            channels,
            free: Semaphore::new(count),
        }
    }

    /// 通道表
    pub fn channels(&self) -> &RegistryTable {
        &self.channels
    }

    /// 通道总数
    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    /// 当前剩余的许可数
    pub fn available(&self) -> usize {
        self.free.count()
    }

    /// 正在等待通道的调用者数量（提示值）
    pub fn waiting(&self) -> usize {
        self.free.waiting()
    }

    /// 借出一个通道，没有空闲通道时阻塞
    ///
    /// # Errors
    /// 拿到许可却没有任何通道可以打开时返回 [`DeviceError::DmaInconsistent`]，
    /// 此时许可已归还。
    pub fn acquire(&self) -> Result<Arc<DriverRegistry>, DeviceError> {
        self.free.wait(1);
        self.open_any()
    }

    /// 借出一个通道，没有空闲通道时返回 [`DeviceError::WouldBlock`]
    pub fn try_acquire(&self) -> Result<Arc<DriverRegistry>, DeviceError> {
        if !self.free.try_wait(1) {
            return Err(DeviceError::WouldBlock);
        }
        self.open_any()
    }

    /// 归还一个许可，在通道自身的 `close` 之后调用
    pub fn release(&self) {
        self.free.signal(1);
    }

    fn open_any(&self) -> Result<Arc<DriverRegistry>, DeviceError> {
        match self.channels.iter().find(|entry| entry.driver().open()) {
            Some(entry) => {
                log::debug!("device: dma channel {} acquired", entry.name());
                Ok(entry.clone())
            }
            None => {
                self.free.signal(1);
                log::error!(
                    "device: dma permit granted but none of {} channels could be opened",
                    self.channels.len()
                );
                Err(DeviceError::DmaInconsistent)
            }
        }
    }
}

impl fmt::Debug for DmaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmaPool")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}
