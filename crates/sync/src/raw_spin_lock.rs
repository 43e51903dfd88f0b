//! 自旋锁实现
//!
//! 测试并设置（test-and-set）自旋锁。RISC-V 的核间访存没有隐式顺序，
//! 所以加锁的交换之后、解锁的写入之前各有一条完整的 `fence`。

use core::hint;
use core::sync::atomic::{AtomicBool, Ordering, fence};

/// 裸自旋锁，只有占用/空闲两种状态。
///
/// 没有持有者信息，不可重入，不保证公平。
/// 通过实现 [`lock_api::RawMutex`]，可以作为 [`lock_api::Mutex`] 的底层锁，
/// 见 [`SpinMutex`](crate::SpinMutex)。
///
/// # 示例
/// ```ignore
/// static LOCK: RawSpinLock = RawSpinLock::new();
/// LOCK.lock();
/// // 临界区代码
/// unsafe { LOCK.unlock() };
/// ```
#[derive(Debug)]
pub struct RawSpinLock {
    lock: AtomicBool,
}

impl RawSpinLock {
    /// 创建一个新的 RawSpinLock 实例。
    pub const fn new() -> Self {
        RawSpinLock {
            lock: AtomicBool::new(false),
        }
    }

    /// 尝试一次获取锁。
    ///
    /// 原子地把锁标志交换为“占用”，返回之前是否空闲。
    pub fn try_lock(&self) -> bool {
        let was_locked = self.lock.swap(true, Ordering::Acquire);
        fence(Ordering::SeqCst);
        !was_locked
    }

    /// 获取锁，必要时自旋等待。
    ///
    /// 先用普通读取轮询直到看到“空闲”，再尝试交换；
    /// 交换失败说明被其它 hart 抢先，继续轮询。
    pub fn lock(&self) {
        loop {
            while self.lock.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
            if self.try_lock() {
                return;
            }
        }
    }

    /// 释放锁。
    ///
    /// # Safety
    /// 调用者必须持有该锁。
    pub unsafe fn unlock(&self) {
        fence(Ordering::SeqCst);
        self.lock.store(false, Ordering::Release);
    }

    /// 检查锁是否被占用
    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: lock/try_lock 只在锁空闲时成功，提供互斥
unsafe impl lock_api::RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    type GuardMarker = lock_api::GuardSend;

    fn lock(&self) {
        RawSpinLock::lock(self)
    }

    fn try_lock(&self) -> bool {
        RawSpinLock::try_lock(self)
    }

    unsafe fn unlock(&self) {
        unsafe { RawSpinLock::unlock(self) }
    }

    fn is_locked(&self) -> bool {
        RawSpinLock::is_locked(self)
    }
}
