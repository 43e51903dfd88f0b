//! 硬件加速器：FFT、AES、SHA256
//!
//! 加速器是系统级单例，`install` 时打开一次并长期持有句柄，
//! 类型化接口不接受句柄参数。

use crate::context::DeviceContext;
use crate::driver::Driver;

/// FFT 方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    /// 正变换
    Forward,
    /// 逆变换
    Backward,
}

/// FFT 加速器驱动程序特征
pub trait FftDriver: Driver {
    /// 16 位定点复数 FFT
    ///
    /// 每个 `u64` 打包两个复数点（实部、虚部各 16 位），
    /// `shift` 为逐级右移掩码。
    fn complex_uint16(
        &self,
        shift: u16,
        direction: FftDirection,
        input: &[u64],
        point_num: usize,
        output: &mut [u64],
    );
}

/// AES 分组模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesCipherMode {
    /// 电子密码本
    Ecb,
    /// 密码分组链接
    Cbc,
    /// 伽罗瓦/计数器模式
    Gcm,
}

/// 一次 AES 运算的参数
///
/// 密钥长度（16、24 或 32 字节）决定 AES-128/192/256。
/// 不需要的字段（ECB 的 `iv`，非 GCM 的 `aad` 与 `tag`）传空切片。
#[derive(Debug)]
pub struct AesParameters<'a> {
    /// 分组模式
    pub mode: AesCipherMode,
    /// 密钥
    pub key: &'a [u8],
    /// 初始向量
    pub iv: &'a [u8],
    /// GCM 附加认证数据
    pub aad: &'a [u8],
    /// 输入数据
    pub input: &'a [u8],
    /// 输出缓冲区，长度不小于 `input`
    pub output: &'a mut [u8],
    /// GCM 认证标签
    pub tag: &'a mut [u8],
}

/// AES 加速器驱动程序特征
pub trait AesDriver: Driver {
    /// 加密
    fn encrypt(&self, params: &mut AesParameters<'_>);

    /// 解密
    fn decrypt(&self, params: &mut AesParameters<'_>);
}

/// SHA256 加速器驱动程序特征
pub trait Sha256Driver: Driver {
    /// 计算 `input` 的摘要
    fn digest(&self, input: &[u8]) -> [u8; 32];
}

impl DeviceContext {
    /// 在 FFT 加速器上做一次变换
    ///
    /// # Panics
    /// 系统表中没有 FFT 设备，或 `install` 尚未打开它时 panic。
    pub fn fft_complex_uint16(
        &self,
        shift: u16,
        direction: FftDirection,
        input: &[u64],
        point_num: usize,
        output: &mut [u64],
    ) {
        let handle = self.fft_handle();
        expect_driver!(self, handle, Fft).complex_uint16(
            shift,
            direction,
            input,
            point_num,
            output,
        );
    }

    /// AES 加密
    pub fn aes_encrypt(&self, params: &mut AesParameters<'_>) {
        let handle = self.aes_handle();
        expect_driver!(self, handle, Aes).encrypt(params);
    }

    /// AES 解密
    pub fn aes_decrypt(&self, params: &mut AesParameters<'_>) {
        let handle = self.aes_handle();
        expect_driver!(self, handle, Aes).decrypt(params);
    }

    /// 计算 SHA256 摘要
    pub fn sha256(&self, input: &[u8]) -> [u8; 32] {
        let handle = self.sha256_handle();
        expect_driver!(self, handle, Sha256).digest(input)
    }
}
