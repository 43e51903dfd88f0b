//! DVP 摄像头接口

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 可控的传感器信号线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvpSignal {
    /// 省电
    PowerDown,
    /// 复位
    Reset,
}

/// 输出像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    /// 分平面 RGB888
    Rgb24Planar,
    /// RGB565
    Rgb565,
}

/// 帧事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvpFrameEvent {
    /// 帧开始
    Begin,
    /// 帧结束
    End,
}

/// 帧事件回调，在中断上下文中调用
pub type DvpOnFrameEvent = fn(event: DvpFrameEvent, userdata: usize);

/// DVP 驱动程序特征
pub trait DvpDriver: Driver {
    /// 输出通道数量
    fn output_num(&self) -> u32;

    /// 配置帧尺寸
    fn config(&self, width: u32, height: u32, auto_enable: bool);

    /// 允许接收下一帧
    fn enable_frame(&self);

    /// 设置信号线电平
    fn set_signal(&self, signal: DvpSignal, value: bool);

    /// 启用或禁用输出通道
    fn set_output_enable(&self, index: u32, enable: bool);

    /// 设置输出通道的格式与缓冲区地址
    fn set_output_attributes(&self, index: u32, format: VideoFormat, output_buffer: usize);

    /// 启用或禁用帧事件
    fn set_frame_event_enable(&self, event: DvpFrameEvent, enable: bool);

    /// 设置帧事件回调，`None` 表示清除
    fn set_on_frame_event(&self, callback: Option<DvpOnFrameEvent>, userdata: usize);

    /// 设置传感器 XCLK 频率，返回实际生效的频率
    fn xclk_set_clock_rate(&self, clock_rate: f64) -> f64;
}

impl DeviceContext {
    /// 配置帧尺寸
    pub fn dvp_config(&self, handle: Handle, width: u32, height: u32, auto_enable: bool) {
        expect_driver!(self, handle, Dvp).config(width, height, auto_enable);
    }

    /// 允许接收下一帧
    pub fn dvp_enable_frame(&self, handle: Handle) {
        expect_driver!(self, handle, Dvp).enable_frame();
    }

    /// 输出通道数量
    pub fn dvp_output_num(&self, handle: Handle) -> u32 {
        expect_driver!(self, handle, Dvp).output_num()
    }

    /// 设置信号线电平
    pub fn dvp_set_signal(&self, handle: Handle, signal: DvpSignal, value: bool) {
        expect_driver!(self, handle, Dvp).set_signal(signal, value);
    }

    /// 启用或禁用输出通道
    pub fn dvp_set_output_enable(&self, handle: Handle, index: u32, enable: bool) {
        expect_driver!(self, handle, Dvp).set_output_enable(index, enable);
    }

    /// 设置输出通道属性
    pub fn dvp_set_output_attributes(
        &self,
        handle: Handle,
        index: u32,
        format: VideoFormat,
        output_buffer: usize,
    ) {
        expect_driver!(self, handle, Dvp).set_output_attributes(index, format, output_buffer);
    }

    /// 启用或禁用帧事件
    pub fn dvp_set_frame_event_enable(&self, handle: Handle, event: DvpFrameEvent, enable: bool) {
        expect_driver!(self, handle, Dvp).set_frame_event_enable(event, enable);
    }

    /// 设置帧事件回调
    pub fn dvp_set_on_frame_event(
        &self,
        handle: Handle,
        callback: Option<DvpOnFrameEvent>,
        userdata: usize,
    ) {
        expect_driver!(self, handle, Dvp).set_on_frame_event(callback, userdata);
    }

    /// 设置 XCLK 频率
    pub fn dvp_xclk_set_clock_rate(&self, handle: Handle, clock_rate: f64) -> f64 {
        expect_driver!(self, handle, Dvp).xclk_set_clock_rate(clock_rate)
    }
}
