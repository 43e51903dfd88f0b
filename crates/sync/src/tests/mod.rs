// Unit tests for the sync primitives.
//
// 每个线程通过 `set_cpu_id` 扮演一个 hart；未注册 ArchOps 时
// `arch_ops()` 在测试下回落到 `MOCK_ARCH_OPS`。

extern crate std;

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::vec::Vec;

use test_support::mock::arch::{MOCK_ARCH_OPS, set_cpu_id};


/// 在模拟的 hart `id` 上运行闭包
fn spawn_on_hart<F, T>(id: usize, f: F) -> thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::spawn(move || {
        set_cpu_id(id);
        f()
    })
}

/// 给另一个线程足够时间推进到阻塞点
fn settle() {
    thread::sleep(Duration::from_millis(50));
}
