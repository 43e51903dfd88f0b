use super::*;
use crate::{DeviceError, DmaFlags, DmaLoop, DmaTransfer};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::vec::Vec;
use sync::Semaphore;

fn transfer() -> DmaTransfer {
    DmaTransfer {
        src: 0x8000_0000,
        dest: 0x8010_0000,
        flags: DmaFlags::SRC_INC | DmaFlags::DEST_INC,
        element_size: 4,
        count: 64,
        burst_size: 1,
    }
}

#[test]
fn test_pool_starts_with_all_channels_free() {
    let ctx = Board::new().context();
    assert_eq!(ctx.dma().capacity(), 2);
    assert_eq!(ctx.dma().available(), 2);
}

#[test]
fn test_open_free_and_close_return_permit() {
    let board = Board::new();
    let ctx = board.context();

    let handle = ctx.dma_open_free().unwrap();
    assert_eq!(ctx.dma().available(), 1);
    assert_eq!(board.dma[0].life.opens(), 1);
    assert_eq!(board.dma[1].life.opens(), 0);

    ctx.dma_close(handle).unwrap();
    assert_eq!(ctx.dma().available(), 2);
    assert_eq!(board.dma[0].life.closes(), 1);
}

#[test]
fn test_second_acquirer_gets_next_channel() {
    let board = Board::new();
    let ctx = board.context();

    let a = ctx.dma_open_free().unwrap();
    let b = ctx.dma_open_free().unwrap();
    assert_ne!(a, b);
    assert_eq!(board.dma[0].life.opens(), 1);
    assert_eq!(board.dma[1].life.opens(), 1);
    assert_eq!(ctx.dma().available(), 0);
}

#[test]
fn test_try_open_free_would_block_when_exhausted() {
    let ctx = Board::new().context();
    let _a = ctx.dma_try_open_free().unwrap();
    let _b = ctx.dma_try_open_free().unwrap();

    assert_eq!(ctx.dma_try_open_free(), Err(DeviceError::WouldBlock));
    assert_eq!(ctx.dma().available(), 0);
}

#[test]
fn test_third_acquirer_blocks_until_release() {
    let board = Board::new();
    let ctx = Arc::new(board.context());

    let acquired = Arc::new(AtomicUsize::new(0));
    let acquirers: Vec<_> = (0..3)
        .map(|hart| {
            let ctx = ctx.clone();
            let acquired = acquired.clone();
            spawn_on_hart(hart % 2, move || {
                let handle = ctx.dma_open_free().unwrap();
                acquired.fetch_add(1, Ordering::SeqCst);
                handle
            })
        })
        .collect();

    settle();
    assert_eq!(acquired.load(Ordering::SeqCst), 2);
    assert_eq!(ctx.dma().available(), 0);
    assert_eq!(ctx.dma().waiting(), 1);

    // 两个已拿到通道的线程先结束，剩下的那个还在等
    let mut pending = Vec::new();
    let mut held = Vec::new();
    for acquirer in acquirers {
        if acquirer.is_finished() {
            held.push(acquirer.join().unwrap());
        } else {
            pending.push(acquirer);
        }
    }
    assert_eq!(held.len(), 2);
    assert_eq!(pending.len(), 1);

    let released = held[0];
    ctx.dma_close(released).unwrap();
    let handle = pending.pop().unwrap().join().unwrap();
    assert_eq!(acquired.load(Ordering::SeqCst), 3);
    assert_eq!(ctx.dma().available(), 0);
    assert_eq!(ctx.dma().waiting(), 0);
    // 第三个线程拿到的正是刚释放的通道
    assert_eq!(handle, released);
    let opens: usize = board.dma.iter().map(|dma| dma.life.opens()).sum();
    assert_eq!(opens, 3);
}

#[test]
fn test_no_openable_channel_returns_permit() {
    let board = Board::new();
    board.dma[0].life.refuse_open();
    board.dma[1].life.refuse_open();
    let ctx = board.context();

    assert_eq!(ctx.dma_open_free(), Err(DeviceError::DmaInconsistent));
    assert_eq!(ctx.dma_try_open_free(), Err(DeviceError::DmaInconsistent));
    assert_eq!(ctx.dma().available(), 2);
    assert_eq!(ctx.open_handles(), 0);
}

#[test]
fn test_handle_exhaustion_releases_channel_and_permit() {
    let board = Board::new();
    let ctx = board.builder().handle_capacity(1).build();
    let _uart = ctx.open("/dev/uart2").unwrap();

    assert_eq!(ctx.dma_open_free(), Err(DeviceError::TooManyHandles));
    assert_eq!(board.dma[0].life.opens(), 1);
    assert_eq!(board.dma[0].life.closes(), 1);
    assert_eq!(ctx.dma().available(), 2);
}

#[test]
fn test_dma_transmit_waits_for_completion() {
    let board = Board::new();
    let ctx = board.context();
    let handle = ctx.dma_open_free().unwrap();

    ctx.dma_set_select_request(handle, 12);
    ctx.dma_config(handle, 1);
    ctx.dma_transmit(handle, &transfer());

    assert_eq!(board.dma[0].request.load(Ordering::SeqCst), 12);
    assert_eq!(board.dma[0].transfers.load(Ordering::SeqCst), 1);
    ctx.dma_close(handle).unwrap();
}

#[test]
fn test_dma_loop_runs_until_stopped() {
    static STAGES: AtomicUsize = AtomicUsize::new(0);
    fn on_stage(userdata: usize) {
        STAGES.fetch_add(userdata, Ordering::SeqCst);
    }

    let ctx = Board::new().context();
    let handle = ctx.dma_open_free().unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let completion = Arc::new(Semaphore::new(0));
    let srcs = [0x8000_0000, 0x8000_1000];
    let dests = [0x5000_0000];

    ctx.dma_loop_async(
        handle,
        &DmaLoop {
            srcs: &srcs,
            dests: &dests,
            flags: DmaFlags::SRC_INC,
            element_size: 2,
            count: 512,
            burst_size: 4,
            stage_completion: Some(on_stage),
            stage_userdata: 1,
            stop: stop.clone(),
        },
        completion.clone(),
    );

    settle();
    stop.store(true, Ordering::SeqCst);
    completion.wait(1);
    assert!(STAGES.load(Ordering::SeqCst) > 0);
}

#[test]
#[should_panic(expected = "expected Dma")]
fn test_dma_entry_point_on_uart_handle_panics() {
    let ctx = Board::new().context();
    let uart = ctx.open("/dev/uart2").unwrap();
    ctx.dma_config(uart, 0);
}

#[test]
fn test_outstanding_channels_never_exceed_pool() {
    const ROUNDS: usize = 100;

    let ctx = Arc::new(Board::new().context());
    let in_use = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..4)
        .map(|hart| {
            let ctx = ctx.clone();
            let in_use = in_use.clone();
            let peak = peak.clone();
            spawn_on_hart(hart % 2, move || {
                for _ in 0..ROUNDS {
                    let handle = ctx.dma_open_free().unwrap();
                    let now = in_use.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    in_use.fetch_sub(1, Ordering::SeqCst);
                    ctx.dma_close(handle).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(ctx.dma().available(), 2);
    assert_eq!(ctx.open_handles(), 0);
}
