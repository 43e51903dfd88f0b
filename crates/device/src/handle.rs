//! 句柄表
//!
//! 固定大小的槽位数组，把小整数句柄映射到已打开的 [`FileObject`]。
//!
//! 约定与语义：
//!
//! - 槽位从“空”变为“占用”只通过一次对空指针的 CAS，分配无需全表锁；
//! - 关闭时先把槽位改为 `CLOSING` 墓碑，等在途的解析者退出，
//!   完成拆除后再用一次原子写入置空；
//! - 每个槽位持有 `FileObject` 的一个强引用，解析句柄得到的是 `Arc` 克隆，
//!   因此并发关闭不会让解析者访问已释放的内存；
//! - 解析窗口（`readers` 加一到减一）内屏蔽本 hart 中断，
//!   同一 hart 上的中断处理程序不会在窗口中关闭槽位并等待一个永远不会退出的解析者。

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hint;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use sync::IntrGuard;

use crate::config::{HANDLE_ALLOC_PASSES, HANDLE_OFFSET};
use crate::driver::{DriverInstance, DriverType};
use crate::error::DeviceError;
use crate::registry::DriverRegistry;

/// 不透明的设备句柄
///
/// 值为槽位下标加 [`HANDLE_OFFSET`]，永远不为 0。
/// 只在成功打开与对应的关闭之间有效；持有整数句柄即拥有完整访问权。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroUsize);

impl Handle {
    /// 从整数还原句柄，0 返回 None
    ///
    /// 不检查槽位是否占用，无效句柄在使用时报告。
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Handle)
    }

    /// 句柄的整数值
    pub fn raw(self) -> usize {
        self.0.get()
    }

    fn from_index(index: usize) -> Self {
        match NonZeroUsize::new(index + HANDLE_OFFSET) {
            Some(raw) => Handle(raw),
            None => unreachable!("HANDLE_OFFSET keeps handles non-zero"),
        }
    }

    fn index(self) -> Option<usize> {
        self.raw().checked_sub(HANDLE_OFFSET)
    }
}

impl From<Handle> for NonZeroUsize {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// 已打开的设备
///
/// 由唯一一个句柄表槽位持有，打开成功时创建，关闭时拆除。
#[derive(Debug)]
pub struct FileObject {
    reg: Arc<DriverRegistry>,
}

impl FileObject {
    /// 包装一个已成功打开的注册表项
    pub fn new(reg: Arc<DriverRegistry>) -> Self {
        Self { reg }
    }

    /// 对应的注册表项
    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.reg
    }

    /// 设备类别
    pub fn driver_type(&self) -> DriverType {
        self.reg.driver_type()
    }

    /// 驱动实例
    pub fn driver(&self) -> &DriverInstance {
        self.reg.driver()
    }
}

/// 正在关闭的槽位标记，不是有效的 `Arc` 数据指针
fn closing() -> *mut FileObject {
    NonNull::<FileObject>::dangling().as_ptr()
}

struct Slot {
    file: AtomicPtr<FileObject>,
    /// 正在解析此槽位的调用者数量
    readers: AtomicUsize,
}

impl Slot {
    const fn new() -> Self {
        Self {
            file: AtomicPtr::new(ptr::null_mut()),
            readers: AtomicUsize::new(0),
        }
    }
}

/// 固定容量的句柄表
pub struct HandleTable {
    slots: Box<[Slot]>,
}

impl HandleTable {
    /// 创建容量为 `capacity` 的空表
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Slot> = (0..capacity).map(|_| Slot::new()).collect();
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    /// 槽位数量
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 当前被占用（含正在关闭）的槽位数量
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.file.load(Ordering::Acquire).is_null())
            .count()
    }

    /// 表是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 为 `file` 分配一个槽位
    ///
    /// 最多扫描 [`HANDLE_ALLOC_PASSES`] 轮，对每个看起来空闲的槽位尝试 CAS，
    /// 第一个成功者胜出。表满时把 `file` 原样交还，由调用方负责拆除。
    pub fn alloc(&self, file: Arc<FileObject>) -> Result<Handle, Arc<FileObject>> {
        let raw = Arc::into_raw(file) as *mut FileObject;
        for _ in 0..HANDLE_ALLOC_PASSES {
            for (index, slot) in self.slots.iter().enumerate() {
                if !slot.file.load(Ordering::Relaxed).is_null() {
                    continue;
                }
                if slot
                    .file
                    .compare_exchange(ptr::null_mut(), raw, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    return Ok(Handle::from_index(index));
                }
            }
        }
        // SAFETY: raw 来自上面的 Arc::into_raw，且没有被任何槽位接收
        Err(unsafe { Arc::from_raw(raw) })
    }

    /// 解析句柄，返回其 FileObject 的一个强引用
    pub fn get(&self, handle: Handle) -> Result<Arc<FileObject>, DeviceError> {
        let slot = self.slot(handle)?;

        let intr = IntrGuard::new();
        slot.readers.fetch_add(1, Ordering::SeqCst);
        let raw = slot.file.load(Ordering::SeqCst);
        let result = if raw.is_null() || raw == closing() {
            Err(DeviceError::BadHandle)
        } else {
            // SAFETY: 槽位持有一个强引用；readers 非零期间 close 不会释放它
            unsafe {
                Arc::increment_strong_count(raw);
                Ok(Arc::from_raw(raw))
            }
        };
        slot.readers.fetch_sub(1, Ordering::SeqCst);
        drop(intr);

        result
    }

    /// 关闭的第一步：把槽位标记为正在关闭，取回槽位持有的强引用
    ///
    /// 返回前等待所有在途的解析者退出。解析者只会在其它 hart 上，
    /// 本 hart 的解析窗口屏蔽了中断。之后的解析和重复关闭都得到
    /// [`DeviceError::BadHandle`]。调用方拆除完毕后必须调用 [`HandleTable::finish_close`]。
    pub fn begin_close(&self, handle: Handle) -> Result<Arc<FileObject>, DeviceError> {
        let slot = self.slot(handle)?;

        let mut raw = slot.file.load(Ordering::SeqCst);
        loop {
            if raw.is_null() || raw == closing() {
                return Err(DeviceError::BadHandle);
            }
            match slot
                .file
                .compare_exchange(raw, closing(), Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => break,
                Err(current) => raw = current,
            }
        }

        while slot.readers.load(Ordering::SeqCst) != 0 {
            hint::spin_loop();
        }

        // SAFETY: 槽位的强引用已经转移给我们，且不再有解析者会增加它
        Ok(unsafe { Arc::from_raw(raw) })
    }

    /// 关闭的第二步：释放槽位
    pub fn finish_close(&self, handle: Handle) {
        if let Ok(slot) = self.slot(handle) {
            debug_assert_eq!(slot.file.load(Ordering::Relaxed), closing());
            slot.file.store(ptr::null_mut(), Ordering::Release);
        }
    }

    fn slot(&self, handle: Handle) -> Result<&Slot, DeviceError> {
        handle
            .index()
            .and_then(|index| self.slots.get(index))
            .ok_or(DeviceError::BadHandle)
    }
}

impl Drop for HandleTable {
    fn drop(&mut self) {
        for slot in self.slots.iter() {
            let raw = slot.file.load(Ordering::Acquire);
            if !raw.is_null() && raw != closing() {
                // SAFETY: 槽位持有的强引用，在这里归还
                drop(unsafe { Arc::from_raw(raw) });
            }
        }
    }
}

impl fmt::Debug for HandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("capacity", &self.capacity())
            .field("used", &self.len())
            .finish()
    }
}
