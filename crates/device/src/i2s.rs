//! I2S 音频接口

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// 采样率（Hz）
    pub sample_rate: u32,
    /// 每个采样的位数
    pub bits_per_sample: u32,
    /// 声道数
    pub channels: u32,
}

/// 数据对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2sAlignMode {
    /// 标准 I2S
    Standard,
    /// 右对齐
    Right,
    /// 左对齐
    Left,
}

/// 驱动借出的 DMA 缓冲区
///
/// 在调用 `release_buffer` 之前有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2sBuffer {
    /// 缓冲区起始地址
    pub addr: usize,
    /// 字节数
    pub len: usize,
    /// 可用的帧数
    pub frames: u32,
}

/// I2S 驱动程序特征
pub trait I2sDriver: Driver {
    /// 配置为播放
    fn config_as_render(
        &self,
        format: &AudioFormat,
        delay_ms: usize,
        align_mode: I2sAlignMode,
        channels_mask: u32,
    );

    /// 配置为录音
    fn config_as_capture(
        &self,
        format: &AudioFormat,
        delay_ms: usize,
        align_mode: I2sAlignMode,
        channels_mask: u32,
    );

    /// 借出下一块缓冲区
    fn get_buffer(&self) -> I2sBuffer;

    /// 归还已处理的帧
    fn release_buffer(&self, frames: u32);

    /// 开始传输
    fn start(&self);

    /// 停止传输
    fn stop(&self);
}

impl DeviceContext {
    /// 配置为播放
    pub fn i2s_config_as_render(
        &self,
        handle: Handle,
        format: &AudioFormat,
        delay_ms: usize,
        align_mode: I2sAlignMode,
        channels_mask: u32,
    ) {
        expect_driver!(self, handle, I2s).config_as_render(
            format,
            delay_ms,
            align_mode,
            channels_mask,
        );
    }

    /// 配置为录音
    pub fn i2s_config_as_capture(
        &self,
        handle: Handle,
        format: &AudioFormat,
        delay_ms: usize,
        align_mode: I2sAlignMode,
        channels_mask: u32,
    ) {
        expect_driver!(self, handle, I2s).config_as_capture(
            format,
            delay_ms,
            align_mode,
            channels_mask,
        );
    }

    /// 借出下一块缓冲区
    pub fn i2s_get_buffer(&self, handle: Handle) -> I2sBuffer {
        expect_driver!(self, handle, I2s).get_buffer()
    }

    /// 归还已处理的帧
    pub fn i2s_release_buffer(&self, handle: Handle, frames: u32) {
        expect_driver!(self, handle, I2s).release_buffer(frames);
    }

    /// 开始传输
    pub fn i2s_start(&self, handle: Handle) {
        expect_driver!(self, handle, I2s).start();
    }

    /// 停止传输
    pub fn i2s_stop(&self, handle: Handle) {
        expect_driver!(self, handle, I2s).stop();
    }
}
