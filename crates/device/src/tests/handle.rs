use super::*;
use crate::config::HANDLE_OFFSET;
use crate::{DeviceError, DriverRegistry, FileObject, Handle, HandleTable};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use std::vec::Vec;
use sync::IntrGuard;
use test_support::mock::arch::{intr_enabled, intr_masks, raise_irq};

fn uart_file() -> Arc<FileObject> {
    setup();
    let uart = Arc::new(MockUart::new(Lifecycle::shared()));
    let reg = DriverRegistry::new("/dev/uart1", DriverInstance::Uart(uart));
    Arc::new(FileObject::new(Arc::new(reg)))
}

#[test]
fn test_handle_zero_is_never_valid() {
    assert!(Handle::from_raw(0).is_none());
    assert_eq!(Handle::from_raw(300).map(Handle::raw), Some(300));
}

#[test]
fn test_alloc_starts_at_offset() {
    let table = HandleTable::new(4);
    let first = table.alloc(uart_file()).unwrap();
    let second = table.alloc(uart_file()).unwrap();

    assert_eq!(first.raw(), HANDLE_OFFSET);
    assert_eq!(second.raw(), HANDLE_OFFSET + 1);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_get_resolves_to_same_file() {
    let table = HandleTable::new(4);
    let file = uart_file();
    let handle = table.alloc(file.clone()).unwrap();

    let resolved = table.get(handle).unwrap();
    assert!(Arc::ptr_eq(&resolved, &file));
    assert_eq!(resolved.registry().name(), "/dev/uart1");
}

#[test]
fn test_out_of_range_handles_are_rejected() {
    setup();
    let table = HandleTable::new(4);
    let below = Handle::from_raw(HANDLE_OFFSET - 1).unwrap();
    let above = Handle::from_raw(HANDLE_OFFSET + 4).unwrap();

    assert_eq!(table.get(below).unwrap_err(), DeviceError::BadHandle);
    assert_eq!(table.get(above).unwrap_err(), DeviceError::BadHandle);
    assert_eq!(table.begin_close(above).unwrap_err(), DeviceError::BadHandle);
}

#[test]
fn test_full_table_hands_file_back() {
    let table = HandleTable::new(2);
    table.alloc(uart_file()).unwrap();
    table.alloc(uart_file()).unwrap();

    let file = uart_file();
    let rejected = table.alloc(file.clone()).unwrap_err();
    assert!(Arc::ptr_eq(&rejected, &file));
    // 表没有留下任何引用
    drop(rejected);
    assert_eq!(Arc::strong_count(&file), 1);
}

#[test]
fn test_close_frees_slot_for_reuse() {
    let table = HandleTable::new(1);
    let handle = table.alloc(uart_file()).unwrap();

    let file = table.begin_close(handle).unwrap();
    assert_eq!(table.get(handle).unwrap_err(), DeviceError::BadHandle);
    drop(file);
    table.finish_close(handle);

    assert!(table.is_empty());
    assert_eq!(table.alloc(uart_file()).unwrap(), handle);
}

#[test]
fn test_double_close_is_bad_handle() {
    let table = HandleTable::new(2);
    let handle = table.alloc(uart_file()).unwrap();

    table.begin_close(handle).unwrap();
    assert_eq!(table.begin_close(handle).unwrap_err(), DeviceError::BadHandle);
    table.finish_close(handle);
    assert_eq!(table.begin_close(handle).unwrap_err(), DeviceError::BadHandle);
}

#[test]
fn test_drop_releases_slot_references() {
    let file = uart_file();
    {
        let table = HandleTable::new(2);
        table.alloc(file.clone()).unwrap();
        assert_eq!(Arc::strong_count(&file), 2);
    }
    assert_eq!(Arc::strong_count(&file), 1);
}

#[test]
fn test_concurrent_alloc_is_injective() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 32;

    let table = Arc::new(HandleTable::new(THREADS * PER_THREAD));
    let workers: Vec<_> = (0..THREADS)
        .map(|hart| {
            let table = table.clone();
            spawn_on_hart(hart % 2, move || {
                (0..PER_THREAD)
                    .map(|_| table.alloc(uart_file()).unwrap().raw())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for worker in workers {
        for raw in worker.join().unwrap() {
            assert!(seen.insert(raw), "handle {} issued twice", raw);
        }
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(table.len(), THREADS * PER_THREAD);
}

#[test]
fn test_resolvers_survive_concurrent_close() {
    let table = Arc::new(HandleTable::new(1));
    let file = uart_file();
    let handle = table.alloc(file.clone()).unwrap();

    let resolver = {
        let table = table.clone();
        spawn_on_hart(1, move || {
            let mut hits = 0;
            for _ in 0..10_000 {
                if let Ok(resolved) = table.get(handle) {
                    assert_eq!(resolved.registry().name(), "/dev/uart1");
                    hits += 1;
                }
            }
            hits
        })
    };

    let closed = table.begin_close(handle).unwrap();
    drop(closed);
    table.finish_close(handle);

    resolver.join().unwrap();
    assert!(table.is_empty());
    assert_eq!(Arc::strong_count(&file), 1);
}

#[test]
fn test_resolve_masks_local_interrupts() {
    set_cpu_id(0);
    let table = HandleTable::new(1);
    let handle = table.alloc(uart_file()).unwrap();

    let before = intr_masks();
    table.get(handle).unwrap();
    assert!(intr_masks() > before);
    assert!(intr_enabled());
}

#[test]
fn test_interrupt_closing_handle_runs_after_resolver_window() {
    static TABLE: OnceLock<HandleTable> = OnceLock::new();
    static HANDLE: AtomicUsize = AtomicUsize::new(0);
    fn irq() {
        let table = TABLE.get().unwrap();
        let handle = Handle::from_raw(HANDLE.load(Ordering::SeqCst)).unwrap();
        drop(table.begin_close(handle).unwrap());
        table.finish_close(handle);
    }

    set_cpu_id(0);
    let file = uart_file();
    let table = TABLE.get_or_init(|| HandleTable::new(1));
    let handle = table.alloc(file.clone()).unwrap();
    HANDLE.store(handle.raw(), Ordering::SeqCst);

    let resolved = {
        let _masked = IntrGuard::new();
        raise_irq(irq);
        table.get(handle).unwrap()
    };

    // 中断在解析者退出之后才进入，关闭不会等待
    assert!(table.is_empty());
    assert!(Arc::ptr_eq(&resolved, &file));
    assert_eq!(table.get(handle).unwrap_err(), DeviceError::BadHandle);
    drop(resolved);
    assert_eq!(Arc::strong_count(&file), 1);
}
