//! 中断控制器与 IRQ 回调表
//!
//! 回调表按 IRQ 号索引，每项是 `(handler, userdata)`。
//! 一项整体在该 IRQ 的自旋锁下写入和读出，分发方拿到的总是同一次注册的两个值；
//! 并发注册时后写者生效。回调在锁外调用，可以在回调里重新注册自己。

use core::fmt;
use sync::SpinLock;

use crate::config::MAX_IRQN;
use crate::context::DeviceContext;
use crate::driver::Driver;

/// IRQ 回调，参数为注册时的 userdata
pub type IrqHandler = fn(userdata: usize);

/// 中断控制器驱动程序特征
pub trait PicDriver: Driver {
    /// 启用或屏蔽一个中断源
    fn set_irq_enable(&self, irq: usize, enable: bool);

    /// 设置中断源优先级
    fn set_irq_priority(&self, irq: usize, priority: usize);
}

type IrqEntry = Option<(IrqHandler, usize)>;

/// IRQ 回调表
pub struct PicTable {
    entries: [SpinLock<IrqEntry>; MAX_IRQN],
}

impl PicTable {
    /// 创建空表
    pub const fn new() -> Self {
        Self {
            entries: [const { SpinLock::new(None) }; MAX_IRQN],
        }
    }

    /// 注册 `irq` 的回调，覆盖已有的回调
    ///
    /// # Panics
    /// `irq >= MAX_IRQN` 时 panic。
    pub fn set_irq_handler(&self, irq: usize, handler: IrqHandler, userdata: usize) {
        assert!(irq < MAX_IRQN, "device: irq {} out of range (max {})", irq, MAX_IRQN);
        *self.entries[irq].lock() = Some((handler, userdata));
    }

    /// 清除 `irq` 的回调
    ///
    /// # Panics
    /// `irq >= MAX_IRQN` 时 panic。
    pub fn clear_irq_handler(&self, irq: usize) {
        assert!(irq < MAX_IRQN, "device: irq {} out of range (max {})", irq, MAX_IRQN);
        *self.entries[irq].lock() = None;
    }

    /// `irq` 是否有回调
    pub fn has_handler(&self, irq: usize) -> bool {
        self.entries
            .get(irq)
            .is_some_and(|entry| entry.lock().is_some())
    }

    /// 分发一次中断：有回调则以其 userdata 调用
    ///
    /// 越界的 IRQ 只记录警告。
    pub fn on_irq(&self, irq: usize) {
        let Some(entry) = self.entries.get(irq) else {
            log::warn!("device: spurious irq {} (max {})", irq, MAX_IRQN);
            return;
        };
        let entry = *entry.lock();
        if let Some((handler, userdata)) = entry {
            handler(userdata);
        }
    }
}

impl fmt::Debug for PicTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = (0..MAX_IRQN).filter(|&irq| self.has_handler(irq)).count();
        f.debug_struct("PicTable")
            .field("registered", &registered)
            .finish()
    }
}

impl Default for PicTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceContext {
    /// 启用或屏蔽一个中断源
    ///
    /// # Panics
    /// 中断控制器尚未在 `install` 中打开时 panic。
    pub fn pic_set_irq_enable(&self, irq: usize, enable: bool) {
        let handle = self.pic_handle();
        expect_driver!(self, handle, Pic).set_irq_enable(irq, enable);
    }

    /// 设置中断源优先级
    pub fn pic_set_irq_priority(&self, irq: usize, priority: usize) {
        let handle = self.pic_handle();
        expect_driver!(self, handle, Pic).set_irq_priority(irq, priority);
    }

    /// 注册 IRQ 回调
    ///
    /// # Panics
    /// `irq >= MAX_IRQN` 时 panic。
    pub fn pic_set_irq_handler(&self, irq: usize, handler: IrqHandler, userdata: usize) {
        self.pic().set_irq_handler(irq, handler, userdata);
    }

    /// 清除 IRQ 回调
    pub fn pic_clear_irq_handler(&self, irq: usize) {
        self.pic().clear_irq_handler(irq);
    }

    /// 中断层入口：分发 `irq` 的回调
    pub fn on_irq(&self, irq: usize) {
        self.pic().on_irq(irq);
    }
}
