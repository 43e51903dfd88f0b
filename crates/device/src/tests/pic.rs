use super::*;
use crate::{IrqHandler, PicTable};
use crate::config::MAX_IRQN;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[test]
fn test_on_irq_passes_userdata() {
    static SEEN: AtomicUsize = AtomicUsize::new(0);
    fn handler(userdata: usize) {
        SEEN.store(userdata, Ordering::SeqCst);
    }

    setup();
    let table = PicTable::new();
    table.set_irq_handler(27, handler, 0xbeef);
    assert!(table.has_handler(27));

    table.on_irq(27);
    assert_eq!(SEEN.load(Ordering::SeqCst), 0xbeef);
}

#[test]
fn test_on_irq_without_handler_is_noop() {
    setup();
    let table = PicTable::new();
    assert!(!table.has_handler(3));
    table.on_irq(3);
}

#[test]
fn test_out_of_range_irq_is_ignored() {
    setup();
    let table = PicTable::new();
    table.on_irq(MAX_IRQN);
    table.on_irq(usize::MAX);
    assert!(!table.has_handler(MAX_IRQN));
}

#[test]
#[should_panic(expected = "out of range")]
fn test_registering_out_of_range_irq_panics() {
    fn handler(_: usize) {}
    setup();
    PicTable::new().set_irq_handler(MAX_IRQN, handler, 0);
}

#[test]
fn test_clear_and_replace_handler() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn first(_: usize) {
        CALLS.fetch_add(1, Ordering::SeqCst);
    }
    fn second(_: usize) {
        CALLS.fetch_add(10, Ordering::SeqCst);
    }

    setup();
    let table = PicTable::new();
    table.set_irq_handler(MAX_IRQN - 1, first, 0);
    table.on_irq(MAX_IRQN - 1);
    table.set_irq_handler(MAX_IRQN - 1, second, 0);
    table.on_irq(MAX_IRQN - 1);
    table.clear_irq_handler(MAX_IRQN - 1);
    table.on_irq(MAX_IRQN - 1);

    assert_eq!(CALLS.load(Ordering::SeqCst), 11);
}

#[test]
fn test_handler_registered_on_one_hart_fires_on_another() {
    static SEEN: AtomicUsize = AtomicUsize::new(0);
    fn handler(userdata: usize) {
        SEEN.store(userdata, Ordering::SeqCst);
    }

    let ctx = Arc::new(Board::new().context());
    ctx.pic_set_irq_handler(5, handler, 42);

    let irq = {
        let ctx = ctx.clone();
        spawn_on_hart(1, move || ctx.on_irq(5))
    };
    irq.join().unwrap();
    assert_eq!(SEEN.load(Ordering::SeqCst), 42);
}

#[test]
fn test_pic_entry_points_use_installed_controller() {
    let board = Board::new();
    let ctx = board.context();
    ctx.install();

    ctx.pic_set_irq_enable(7, true);
    ctx.pic_set_irq_priority(7, 3);
    assert_eq!(*board.pic.enabled.lock().unwrap(), [(7usize, true)]);
    assert_eq!(*board.pic.priorities.lock().unwrap(), [(7usize, 3usize)]);
}

#[test]
#[should_panic(expected = "/dev/pic0 is not open")]
fn test_pic_entry_point_before_install_panics() {
    let ctx = Board::new().context();
    ctx.pic_set_irq_enable(7, true);
}

#[test]
fn test_dispatch_sees_handler_and_userdata_from_one_registration() {
    static MISMATCHES: AtomicUsize = AtomicUsize::new(0);
    fn even(userdata: usize) {
        if userdata % 2 != 0 {
            MISMATCHES.fetch_add(1, Ordering::SeqCst);
        }
    }
    fn odd(userdata: usize) {
        if userdata % 2 != 1 {
            MISMATCHES.fetch_add(1, Ordering::SeqCst);
        }
    }

    setup();
    let table = Arc::new(PicTable::new());
    table.set_irq_handler(9, even, 0);
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let table = table.clone();
        let stop = stop.clone();
        spawn_on_hart(1, move || {
            let mut n = 0usize;
            while !stop.load(Ordering::SeqCst) {
                let handler: IrqHandler = if n % 2 == 0 { even } else { odd };
                table.set_irq_handler(9, handler, n);
                n += 1;
            }
        })
    };

    set_cpu_id(0);
    for _ in 0..20_000 {
        table.on_irq(9);
    }
    stop.store(true, Ordering::SeqCst);
    writer.join().unwrap();

    assert_eq!(MISMATCHES.load(Ordering::SeqCst), 0);
}

#[test]
fn test_handler_may_reregister_itself() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    static TABLE: PicTable = PicTable::new();
    fn handler(userdata: usize) {
        CALLS.fetch_add(1, Ordering::SeqCst);
        TABLE.set_irq_handler(11, handler, userdata + 1);
    }

    setup();
    TABLE.set_irq_handler(11, handler, 0);
    TABLE.on_irq(11);
    TABLE.on_irq(11);
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
}
