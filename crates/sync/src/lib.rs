//! 多核同步原语
//!
//! 向 HAL 设备层和驱动提供基本的锁和同步原语，包括：
//!
//! - [`RawSpinLock`] - 带显式内存屏障的测试并设置自旋锁
//! - [`SpinLock`] / [`SpinMutex`] - 持有数据的自旋锁封装
//! - [`Semaphore`] - 计数信号量，等待时让出 CPU
//! - [`HartLock`] - 感知持有者 hart 的可重入锁
//! - [`IntrGuard`] - 本地中断保护
//!
//! # 架构依赖
//!
//! 此 crate 通过 `ArchOps` trait 抽象架构相关操作。
//! 使用前必须调用 `register_arch_ops` 注册实现。

#![no_std]

mod hart_lock;
mod intr_guard;
mod raw_spin_lock;
mod semaphore;
mod spin_lock;

#[cfg(test)]
mod tests;

pub use hart_lock::*;
pub use intr_guard::*;
pub use raw_spin_lock::*;
pub use semaphore::*;
pub use spin_lock::*;

use core::sync::atomic::{AtomicUsize, Ordering};

/// 架构相关操作的 trait
///
/// 由平台层实现并注册，提供中断控制、hart 信息和调度让出
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);

    /// 获取 MSTATUS_MIE 常量（中断使能位）
    fn mstatus_mie(&self) -> usize;

    /// 获取当前 hart ID（`mhartid`）
    fn cpu_id(&self) -> usize;

    /// 获取最大 hart 数量
    fn max_cpu_count(&self) -> usize;

    /// 让出当前 hart，交给调度器
    ///
    /// 调度器启动前可实现为 `core::hint::spin_loop()`。
    fn yield_now(&self);
}

/// 全局架构操作实例（存储 fat pointer 的两个部分）
static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: transmute 在这里是安全的，因为 fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
    ARCH_OPS_DATA.store(data, Ordering::Release);
}

/// 获取架构操作实例
#[inline]
pub(crate) fn arch_ops() -> &'static dyn ArchOps {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        #[cfg(test)]
        {
            extern crate test_support;
            return &test_support::mock::arch::MOCK_ARCH_OPS;
        }
        #[cfg(not(test))]
        panic!("sync: ArchOps not registered, call register_arch_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) }
}

/// 当前 hart ID
#[inline]
pub fn current_hart() -> usize {
    arch_ops().cpu_id()
}
