//! 设备层配置常量

/// 句柄表默认槽位数
pub const MAX_HANDLES: usize = 256;

/// 句柄值的基数：句柄 = 槽位下标 + HANDLE_OFFSET
///
/// 非零基数保证有效句柄永远不会是 0。
pub const HANDLE_OFFSET: usize = 256;

/// 动态（custom）驱动表容量
pub const MAX_CUSTOM_DRIVERS: usize = 32;

/// PIC 回调表大小，等于最大中断号
pub const MAX_IRQN: usize = 65;

/// 分配句柄时最多扫描句柄表的轮数
///
/// 第二轮用来容忍并发打开者造成的短暂竞争。
pub const HANDLE_ALLOC_PASSES: usize = 2;

/// 中断控制器设备名，`install_hal` 时打开
pub const PIC_DEVICE: &str = "/dev/pic0";

/// FFT 加速器设备名
pub const FFT_DEVICE: &str = "/dev/fft0";

/// AES 加速器设备名
pub const AES_DEVICE: &str = "/dev/aes0";

/// SHA256 加速器设备名
pub const SHA256_DEVICE: &str = "/dev/sha256";
