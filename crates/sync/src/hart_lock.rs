//! 跨 hart 的可重入锁
//!
//! 普通自旋锁在同一 hart 上嵌套获取会死锁自己；HartLock 记录持有者 hart，
//! 持有者可以无阻塞地重复获取，其它 hart 则等待计数归零后再竞争。
//!
//! 状态只有两种：
//!
//! | 状态 | `count` | `owner` |
//! |---|---|---|
//! | 空闲 | 0 | [`NO_OWNER`] |
//! | 被 hart X 持有 d 层 | d ≥ 1 | X |
//!
//! 修改状态的短临界区里本 hart 的中断被屏蔽，
//! 中断处理程序因此不会在任务持有内部自旋锁时插入并在同一 hart 上自旋。

use core::hint;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::intr_guard::IntrGuard;
use crate::raw_spin_lock::RawSpinLock;

/// 表示无人持有的 owner 值
pub const NO_OWNER: usize = usize::MAX;

/// 感知持有者 hart 的可重入锁
///
/// `count` 与 `owner` 只在内部自旋锁保护下、屏蔽本 hart 中断时修改；
/// 等待方在锁外用普通读取轮询 `count`。
#[derive(Debug)]
pub struct HartLock {
    lock: RawSpinLock,
    count: AtomicUsize,
    owner: AtomicUsize,
}

impl HartLock {
    /// 创建一个空闲的 HartLock
    pub const fn new() -> Self {
        Self {
            lock: RawSpinLock::new(),
            count: AtomicUsize::new(0),
            owner: AtomicUsize::new(NO_OWNER),
        }
    }

    /// 尝试获取锁，不阻塞
    ///
    /// 空闲或已被当前 hart 持有时成功（后者嵌套深度加一）；
    /// 被其它 hart 持有时返回 false，状态不变。
    pub fn try_lock(&self) -> bool {
        let intr = IntrGuard::new();
        let hart = intr.hart();
        self.lock.lock();

        let count = self.count.load(Ordering::Relaxed);
        let acquired = if count == 0 {
            self.owner.store(hart, Ordering::Relaxed);
            self.count.store(1, Ordering::Relaxed);
            true
        } else if self.owner.load(Ordering::Relaxed) == hart {
            self.count.store(count + 1, Ordering::Relaxed);
            true
        } else {
            false
        };

        // SAFETY: 上面已经获取了内部自旋锁
        unsafe { self.lock.unlock() };
        acquired
    }

    /// 获取锁
    ///
    /// 被其它 hart 持有时，轮询 `count` 直到归零，再重新竞争。
    pub fn lock(&self) {
        while !self.try_lock() {
            while self.count.load(Ordering::Relaxed) != 0 {
                hint::spin_loop();
            }
        }
    }

    /// 释放一层嵌套，深度归零时锁变为空闲
    ///
    /// # Panics
    /// 当前 hart 不是持有者时 panic，锁状态保持不变。
    pub fn unlock(&self) {
        let intr = IntrGuard::new();
        let hart = intr.hart();
        self.lock.lock();

        let count = self.count.load(Ordering::Relaxed);
        let owner = self.owner.load(Ordering::Relaxed);
        if count == 0 || owner != hart {
            // SAFETY: 上面已经获取了内部自旋锁
            unsafe { self.lock.unlock() };
            drop(intr);
            let owner = (owner != NO_OWNER).then_some(owner);
            panic!(
                "sync: hart {} released a HartLock it does not own (owner: {:?}, depth: {})",
                hart, owner, count
            );
        }

        if count == 1 {
            self.owner.store(NO_OWNER, Ordering::Relaxed);
        }
        self.count.store(count - 1, Ordering::Relaxed);

        // SAFETY: 上面已经获取了内部自旋锁
        unsafe { self.lock.unlock() };
    }

    /// 获取锁并返回 RAII 保护器，离开作用域时释放一层
    pub fn lock_guard(&self) -> HartLockGuard<'_> {
        self.lock();
        HartLockGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// 当前持有者 hart，空闲时返回 None
    pub fn owner(&self) -> Option<usize> {
        match self.owner.load(Ordering::Relaxed) {
            NO_OWNER => None,
            hart => Some(hart),
        }
    }

    /// 当前嵌套深度，空闲时为 0
    pub fn depth(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for HartLock {
    fn default() -> Self {
        Self::new()
    }
}

/// [`HartLock`] 的 RAII 保护器
///
/// 不实现 Send：释放必须发生在获取它的 hart 上。
pub struct HartLockGuard<'a> {
    lock: &'a HartLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for HartLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
