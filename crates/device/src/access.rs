//! 驱动打开计数辅助
//!
//! 叶子驱动实现 [`Driver::open`](crate::Driver::open) / [`Driver::close`](crate::Driver::close)
//! 时常见的两种访问方式：
//!
//! - [`SharedAccess`]：可被同时打开多次，第一次打开时上电、最后一次关闭时断电；
//! - [`ExclusiveAccess`]：同一时刻只能被打开一次，第二次打开被拒绝。
//!
//! ```ignore
//! impl Driver for Uart {
//!     fn install(&self) {}
//!
//!     fn open(&self) -> bool {
//!         self.access.open(|| self.power_on())
//!     }
//!
//!     fn close(&self) {
//!         self.access.close(|| self.power_off())
//!     }
//! }
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use sync::SpinMutex;

/// 引用计数的共享访问
///
/// 计数与首次打开、末次关闭回调在同一把锁下执行：
/// 第二个打开者返回时，第一次打开的回调一定已经完成。
/// 回调里不能再对同一个 `SharedAccess` 调用 `open`/`close`。
#[derive(Debug, Default)]
pub struct SharedAccess {
    used: SpinMutex<usize>,
}

impl SharedAccess {
    /// 创建未被打开的访问计数
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开一次
    ///
    /// 计数从 0 变 1 时先调用 `on_first_open`；它返回 false 时打开失败，计数保持为 0。
    pub fn open(&self, on_first_open: impl FnOnce() -> bool) -> bool {
        let mut used = self.used.lock();
        if *used == 0 && !on_first_open() {
            return false;
        }
        *used += 1;
        true
    }

    /// 关闭一次，计数从 1 变 0 时调用 `on_last_close`
    ///
    /// # Panics
    /// 没有未关闭的打开时 panic。
    pub fn close(&self, on_last_close: impl FnOnce()) {
        let mut used = self.used.lock();
        assert!(*used > 0, "device: close without a matching open");
        *used -= 1;
        if *used == 0 {
            on_last_close();
        }
    }

    /// 当前未关闭的打开次数
    pub fn used(&self) -> usize {
        *self.used.lock()
    }
}

/// 独占访问
#[derive(Debug, Default)]
pub struct ExclusiveAccess {
    busy: AtomicBool,
}

impl ExclusiveAccess {
    /// 创建空闲的独占访问
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// 尝试占用，已被占用时返回 false
    pub fn open(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// 释放占用
    pub fn close(&self) {
        let was_busy = self.busy.swap(false, Ordering::Release);
        debug_assert!(was_busy, "device: close without a matching open");
    }

    /// 是否被占用
    pub fn is_open(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
