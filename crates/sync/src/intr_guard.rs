//! 本地中断保护
//!
//! 守卫存活期间本 hart 的中断被屏蔽，离开作用域时恢复为进入前的状态。
//! 它只排除同一 hart 上“任务与中断处理程序”之间的并发，
//! 另一个 hart 仍然可以并行运行，所以跨核共享的数据还要配合自旋锁。
//!
//! 保存的中断状态属于创建守卫的那个 hart，因此守卫不能被移交给其它 hart。

use core::marker::PhantomData;

use crate::arch_ops;

/// 屏蔽本 hart 中断的 RAII 守卫
///
/// 嵌套使用是安全的：内层守卫保存的是“已屏蔽”状态，
/// 恢复时不会提前打开中断。
///
/// ```ignore
/// let _guard = IntrGuard::new();
/// // 本 hart 上的中断处理程序不会在这里插入执行
/// ```
pub struct IntrGuard {
    flags: usize,
    hart: usize,
    /// 保存的状态只对创建它的 hart 有意义
    _not_send: PhantomData<*const ()>,
}

impl IntrGuard {
    /// 屏蔽本 hart 的中断并记录之前的状态
    pub fn new() -> Self {
        let ops = arch_ops();
        // SAFETY: 返回的 flags 只在本守卫 Drop 时交还给 restore_interrupts
        let flags = unsafe { ops.read_and_disable_interrupts() };
        Self {
            flags,
            hart: ops.cpu_id(),
            _not_send: PhantomData,
        }
    }

    /// 进入前中断是否处于开启状态
    pub fn was_enabled(&self) -> bool {
        self.flags & arch_ops().mstatus_mie() != 0
    }

    /// 创建守卫的 hart
    pub fn hart(&self) -> usize {
        self.hart
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        let ops = arch_ops();
        debug_assert_eq!(
            ops.cpu_id(),
            self.hart,
            "sync: IntrGuard released on a different hart"
        );
        // SAFETY: flags 来自同一 hart 上的 read_and_disable_interrupts
        unsafe { ops.restore_interrupts(self.flags) };
    }
}
