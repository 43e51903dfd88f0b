// Unit tests for the device layer.
//
// `sync` 以非测试配置编译进来，没有 Mock 回落，因此每个测试先调用
// `setup()` 注册一个转发到 `MOCK_ARCH_OPS` 的本地 ArchOps。

use alloc::sync::Arc;
use std::sync::Once;
use std::thread;
use std::time::Duration;

use test_support::mock::arch::{MOCK_ARCH_OPS, set_cpu_id};

use crate::{DeviceContext, DeviceContextBuilder, DriverInstance};

mod dma;
mod handle;
mod pic;
mod registry;

use mock::*;

struct TestArch;

impl sync::ArchOps for TestArch {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        unsafe { MOCK_ARCH_OPS.read_and_disable_interrupts() }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        unsafe { MOCK_ARCH_OPS.restore_interrupts(flags) }
    }

    fn mstatus_mie(&self) -> usize {
        MOCK_ARCH_OPS.mstatus_mie()
    }

    fn cpu_id(&self) -> usize {
        MOCK_ARCH_OPS.cpu_id()
    }

    fn max_cpu_count(&self) -> usize {
        MOCK_ARCH_OPS.max_cpu_count()
    }

    fn yield_now(&self) {
        MOCK_ARCH_OPS.yield_now()
    }
}

static TEST_ARCH: TestArch = TestArch;
static REGISTER: Once = Once::new();

fn setup() {
    // SAFETY: Once 保证只注册一次
    REGISTER.call_once(|| unsafe { sync::register_arch_ops(&TEST_ARCH) });
}

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

/// 一块典型的板子：两个 UART（uart1 独占）、一个 GPIO、中断控制器、
/// 两个 DMA 通道、SHA256 加速器
struct Board {
    uart1: Arc<MockUart>,
    uart2: Arc<MockUart>,
    gpio: Arc<MockGpio>,
    pic: Arc<MockPic>,
    dma: [Arc<MockDma>; 2],
    sha256: Arc<MockSha256>,
}

impl Board {
    fn new() -> Self {
        Self {
            uart1: Arc::new(MockUart::new(Lifecycle::exclusive())),
            uart2: Arc::new(MockUart::new(Lifecycle::shared())),
            gpio: Arc::new(MockGpio::new(8)),
            pic: Arc::new(MockPic::default()),
            dma: [Arc::new(MockDma::default()), Arc::new(MockDma::default())],
            sha256: Arc::new(MockSha256::default()),
        }
    }

    fn builder(&self) -> DeviceContextBuilder {
        setup();
        DeviceContextBuilder::new()
            .hal("/dev/uart1", DriverInstance::Uart(self.uart1.clone()))
            .and_then(|b| b.hal("/dev/uart2", DriverInstance::Uart(self.uart2.clone())))
            .and_then(|b| b.hal("/dev/gpio0", DriverInstance::Gpio(self.gpio.clone())))
            .and_then(|b| b.hal("/dev/pic0", DriverInstance::Pic(self.pic.clone())))
            .and_then(|b| b.dma("/dev/dma0", self.dma[0].clone()))
            .and_then(|b| b.dma("/dev/dma1", self.dma[1].clone()))
            .and_then(|b| b.system("/dev/sha256", DriverInstance::Sha256(self.sha256.clone())))
            .unwrap()
    }

    fn context(&self) -> DeviceContext {
        self.builder().build()
    }
}
