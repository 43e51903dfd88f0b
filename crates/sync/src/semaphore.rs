//! 计数信号量
//!
//! 由自旋锁保护的计数器。等待方在每次检查失败后通过
//! [`ArchOps::yield_now`](crate::ArchOps::yield_now) 让出 hart，
//! 而不是空转占满 CPU。

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::arch_ops;
use crate::spin_lock::SpinLock;

/// 计数信号量
///
/// `count` 只在锁内修改，永远不会为负。
/// `waiting` 是不受锁保护的提示值：进入等待前加一，成功获取后减一，
/// 在检查与递减之间可能短暂偏大。
///
/// 可以跨 hart 使用，没有 FIFO 公平性：任何等待者都可能抢到释放的计数。
#[derive(Debug)]
pub struct Semaphore {
    count: SpinLock<usize>,
    waiting: AtomicUsize,
}

impl Semaphore {
    /// 创建初始计数为 `count` 的信号量
    pub const fn new(count: usize) -> Self {
        Self {
            count: SpinLock::new(count),
            waiting: AtomicUsize::new(0),
        }
    }

    /// 增加 `n` 个计数
    pub fn signal(&self, n: usize) {
        *self.count.lock() += n;
    }

    /// 等待直到计数不少于 `n`，然后原子地减去 `n`
    ///
    /// 没有超时；需要不阻塞的语义时使用 [`Semaphore::try_wait`]。
    pub fn wait(&self, n: usize) {
        self.waiting.fetch_add(1, Ordering::Relaxed);
        loop {
            if self.take(n) {
                self.waiting.fetch_sub(1, Ordering::Relaxed);
                return;
            }
            arch_ops().yield_now();
        }
    }

    /// 尝试一次减去 `n` 个计数，计数不足时立即返回 false
    pub fn try_wait(&self, n: usize) -> bool {
        self.take(n)
    }

    /// 当前计数（加锁读取的瞬时值）
    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    /// 正在等待的调用者数量（提示值）
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Relaxed)
    }

    fn take(&self, n: usize) -> bool {
        let mut count = self.count.lock();
        if *count >= n {
            *count -= n;
            true
        } else {
            false
        }
    }
}
