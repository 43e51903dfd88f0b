//! DMA 控制器与通道
//!
//! 通道不按名字打开，而是通过 [`DeviceContext::dma_open_free`] 从通道池借出。

mod pool;

pub use pool::DmaPool;

use alloc::sync::Arc;
use bitflags::bitflags;
use core::sync::atomic::AtomicBool;
use sync::Semaphore;

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::error::DeviceError;
use crate::handle::Handle;

bitflags! {
    /// 传输地址的递增方式
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DmaFlags: u32 {
        /// 每个元素后源地址递增
        const SRC_INC = 1 << 0;
        /// 每个元素后目标地址递增
        const DEST_INC = 1 << 1;
    }
}

/// 一次单段传输
///
/// 地址是设备可见的物理地址，调用方保证在传输完成前有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaTransfer {
    /// 源地址
    pub src: usize,
    /// 目标地址
    pub dest: usize,
    /// 地址递增方式
    pub flags: DmaFlags,
    /// 元素大小（字节）
    pub element_size: usize,
    /// 元素个数
    pub count: usize,
    /// 突发长度
    pub burst_size: usize,
}

/// 每完成一段循环传输时调用，在中断上下文中执行
pub type DmaStageCompletion = fn(userdata: usize);

/// 循环传输：依次在 `srcs` 与 `dests` 之间搬运，直到 `stop` 被置位
#[derive(Debug)]
pub struct DmaLoop<'a> {
    /// 源地址列表
    pub srcs: &'a [usize],
    /// 目标地址列表
    pub dests: &'a [usize],
    /// 地址递增方式
    pub flags: DmaFlags,
    /// 元素大小（字节）
    pub element_size: usize,
    /// 每段的元素个数
    pub count: usize,
    /// 突发长度
    pub burst_size: usize,
    /// 段完成回调
    pub stage_completion: Option<DmaStageCompletion>,
    /// 段完成回调的 userdata
    pub stage_userdata: usize,
    /// 置位后在当前段结束时停止
    pub stop: Arc<AtomicBool>,
}

/// DMA 通道驱动程序特征
pub trait DmaDriver: Driver {
    /// 选择外设请求线
    fn set_select_request(&self, request: u32);

    /// 设置通道优先级
    fn config(&self, priority: u32);

    /// 启动传输，完成时对 `completion` 调用一次 `signal(1)`
    fn transmit_async(&self, transfer: &DmaTransfer, completion: Arc<Semaphore>);

    /// 启动循环传输，停止后对 `completion` 调用一次 `signal(1)`
    fn loop_async(&self, transfer: &DmaLoop<'_>, completion: Arc<Semaphore>);
}

/// DMA 控制器驱动程序特征
pub trait DmacDriver: Driver {}

impl DeviceContext {
    /// 从通道池借出一个通道并返回其句柄，没有空闲通道时阻塞
    ///
    /// # Errors
    /// [`DeviceError::DmaInconsistent`] 或 [`DeviceError::TooManyHandles`]。
    pub fn dma_open_free(&self) -> Result<Handle, DeviceError> {
        let reg = self.dma().acquire()?;
        self.alloc_file(reg)
    }

    /// 非阻塞地借出一个通道
    ///
    /// # Errors
    /// 没有空闲通道时返回 [`DeviceError::WouldBlock`]，其余同 [`DeviceContext::dma_open_free`]。
    pub fn dma_try_open_free(&self) -> Result<Handle, DeviceError> {
        let reg = self.dma().try_acquire()?;
        self.alloc_file(reg)
    }

    /// 归还通道，等同于 [`DeviceContext::close`]
    pub fn dma_close(&self, handle: Handle) -> Result<(), DeviceError> {
        self.close(handle)
    }

    /// 选择外设请求线
    pub fn dma_set_select_request(&self, handle: Handle, request: u32) {
        expect_driver!(self, handle, Dma).set_select_request(request);
    }

    /// 设置通道优先级
    pub fn dma_config(&self, handle: Handle, priority: u32) {
        expect_driver!(self, handle, Dma).config(priority);
    }

    /// 启动传输，不等待完成
    pub fn dma_transmit_async(
        &self,
        handle: Handle,
        transfer: &DmaTransfer,
        completion: Arc<Semaphore>,
    ) {
        expect_driver!(self, handle, Dma).transmit_async(transfer, completion);
    }

    /// 传输并等待完成
    pub fn dma_transmit(&self, handle: Handle, transfer: &DmaTransfer) {
        let completion = Arc::new(Semaphore::new(0));
        self.dma_transmit_async(handle, transfer, completion.clone());
        completion.wait(1);
    }

    /// 启动循环传输，不等待完成
    pub fn dma_loop_async(
        &self,
        handle: Handle,
        transfer: &DmaLoop<'_>,
        completion: Arc<Semaphore>,
    ) {
        expect_driver!(self, handle, Dma).loop_async(transfer, completion);
    }
}
