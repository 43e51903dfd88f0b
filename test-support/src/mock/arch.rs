//! 架构相关操作的 Mock 实现
//!
//! 注意：这里不直接依赖 `sync` crate（避免循环依赖）。
//! `sync` crate 在 `cfg(test)` 下为 [`MockArchOps`] 实现 `ArchOps`；
//! 其它 crate 的测试用本地包装类型转发到这里。
//!
//! hart ID 和中断使能位都按线程保存：测试中每个线程调用 [`set_cpu_id`] 即可扮演一个 hart。
//! [`raise_irq`] 在当前 hart 上触发一次中断，中断被屏蔽时挂起，
//! 到下一次恢复为开启状态时才进入处理程序，与真实硬件的挂起语义一致。

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::vec::Vec;

std::thread_local! {
    static CPU_ID: Cell<usize> = const { Cell::new(0) };
    static INTR_ENABLED: Cell<bool> = const { Cell::new(true) };
    static INTR_MASKS: Cell<usize> = const { Cell::new(0) };
    static PENDING_IRQS: RefCell<Vec<fn()>> = const { RefCell::new(Vec::new()) };
}

/// 设置当前线程模拟的 hart ID
pub fn set_cpu_id(id: usize) {
    CPU_ID.with(|c| c.set(id));
}

/// 当前 hart 的中断是否开启
pub fn intr_enabled() -> bool {
    INTR_ENABLED.with(|c| c.get())
}

/// 当前 hart 累计关闭中断的次数
pub fn intr_masks() -> usize {
    INTR_MASKS.with(|c| c.get())
}

/// 在当前 hart 上触发一次中断
///
/// 中断开启时立即进入 `handler`；否则挂起，等中断恢复开启时再进入。
pub fn raise_irq(handler: fn()) {
    if intr_enabled() {
        take_irq(handler);
    } else {
        PENDING_IRQS.with(|pending| pending.borrow_mut().push(handler));
    }
}

/// 进入处理程序期间中断保持关闭，返回时重新开启
fn take_irq(handler: fn()) {
    INTR_ENABLED.with(|c| c.set(false));
    handler();
    INTR_ENABLED.with(|c| c.set(true));
}

fn deliver_pending() {
    loop {
        let next = PENDING_IRQS.with(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        });
        match next {
            Some(handler) => take_irq(handler),
            None => return,
        }
    }
}

/// Mock 架构操作
pub struct MockArchOps {
    pub max_cpus: AtomicUsize,
    /// `yield_now` 被调用的次数
    pub yields: AtomicUsize,
}

impl MockArchOps {
    pub const fn new() -> Self {
        Self {
            max_cpus: AtomicUsize::new(2),
            yields: AtomicUsize::new(0),
        }
    }

    pub unsafe fn read_and_disable_interrupts(&self) -> usize {
        INTR_MASKS.with(|c| c.set(c.get() + 1));
        if INTR_ENABLED.with(|c| c.replace(false)) {
            self.mstatus_mie()
        } else {
            0
        }
    }

    pub unsafe fn restore_interrupts(&self, flags: usize) {
        let enable = flags & self.mstatus_mie() != 0;
        INTR_ENABLED.with(|c| c.set(enable));
        if enable {
            deliver_pending();
        }
    }

    pub fn mstatus_mie(&self) -> usize {
        0x8 // MIE bit
    }

    pub fn cpu_id(&self) -> usize {
        CPU_ID.with(|c| c.get())
    }

    pub fn max_cpu_count(&self) -> usize {
        self.max_cpus.load(Ordering::Relaxed)
    }

    pub fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
        std::thread::yield_now();
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
