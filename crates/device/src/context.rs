//! 设备运行时上下文
//!
//! [`DeviceContext`] 持有全部注册表、句柄表、DMA 通道池和 IRQ 回调表，
//! 通用接口（`open`/`read`/`write`/`control`/`close`）在这里实现，
//! 各设备类别的类型化接口分布在对应模块的 `impl DeviceContext` 中。

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::num::NonZeroUsize;
use once_cell::race::{OnceBox, OnceNonZeroUsize};

use crate::config::{
    AES_DEVICE, FFT_DEVICE, MAX_CUSTOM_DRIVERS, MAX_HANDLES, PIC_DEVICE, SHA256_DEVICE,
};
use crate::custom::CustomDriver;
use crate::dma::{DmaDriver, DmaPool};
use crate::driver::{DriverInstance, DriverType};
use crate::error::DeviceError;
use crate::handle::{FileObject, Handle, HandleTable};
use crate::pic::PicTable;
use crate::registry::{CustomTable, DriverRegistry, RegistryTable};

static DEVICES: OnceBox<DeviceContext> = OnceBox::new();

/// 安装全局设备上下文
///
/// # Errors
/// 已经安装过时返回 [`DeviceError::AlreadyExists`]，传入的上下文被丢弃。
pub fn init(ctx: DeviceContext) -> Result<&'static DeviceContext, DeviceError> {
    DEVICES
        .set(Box::new(ctx))
        .map_err(|_| DeviceError::AlreadyExists)?;
    Ok(devices())
}

/// 获取全局设备上下文
///
/// # Panics
/// 尚未调用 [`init`] 时 panic。
pub fn devices() -> &'static DeviceContext {
    match DEVICES.get() {
        Some(ctx) => ctx,
        None => panic!("device: context not initialized, call device::init first"),
    }
}

/// [`DeviceContext`] 的构建器
///
/// 静态表只能在这里填充，构建完成后不可变。
#[derive(Debug)]
pub struct DeviceContextBuilder {
    hal: RegistryTable,
    dma: RegistryTable,
    system: RegistryTable,
    handle_capacity: usize,
    custom_capacity: usize,
}

impl DeviceContextBuilder {
    /// 使用默认容量创建构建器
    pub fn new() -> Self {
        Self {
            hal: RegistryTable::new(),
            dma: RegistryTable::new(),
            system: RegistryTable::new(),
            handle_capacity: MAX_HANDLES,
            custom_capacity: MAX_CUSTOM_DRIVERS,
        }
    }

    /// 向 `hal` 表注册片上外设
    pub fn hal(mut self, name: &str, driver: DriverInstance) -> Result<Self, DeviceError> {
        self.hal.register(name, driver)?;
        Ok(self)
    }

    /// 向 `dma` 表注册一个通道
    pub fn dma(mut self, name: &str, driver: Arc<dyn DmaDriver>) -> Result<Self, DeviceError> {
        self.dma.register(name, DriverInstance::Dma(driver))?;
        Ok(self)
    }

    /// 向 `system` 表注册板级设备
    pub fn system(mut self, name: &str, driver: DriverInstance) -> Result<Self, DeviceError> {
        self.system.register(name, driver)?;
        Ok(self)
    }

    /// 句柄表容量
    pub fn handle_capacity(mut self, capacity: usize) -> Self {
        self.handle_capacity = capacity;
        self
    }

    /// custom 表容量
    pub fn custom_capacity(mut self, capacity: usize) -> Self {
        self.custom_capacity = capacity;
        self
    }

    /// 构建上下文
    pub fn build(self) -> DeviceContext {
        DeviceContext {
            hal: self.hal,
            system: self.system,
            custom: CustomTable::new(self.custom_capacity),
            handles: HandleTable::new(self.handle_capacity),
            dma: DmaPool::new(self.dma),
            pic: PicTable::new(),
            pic_handle: OnceNonZeroUsize::new(),
            fft_handle: OnceNonZeroUsize::new(),
            aes_handle: OnceNonZeroUsize::new(),
            sha256_handle: OnceNonZeroUsize::new(),
        }
    }
}

impl Default for DeviceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 设备运行时上下文
#[derive(Debug)]
pub struct DeviceContext {
    hal: RegistryTable,
    system: RegistryTable,
    custom: CustomTable,
    handles: HandleTable,
    dma: DmaPool,
    pic: PicTable,
    pic_handle: OnceNonZeroUsize,
    fft_handle: OnceNonZeroUsize,
    aes_handle: OnceNonZeroUsize,
    sha256_handle: OnceNonZeroUsize,
}

impl DeviceContext {
    /// 按启动顺序安装全部驱动
    ///
    /// 依次为：`hal` 表、打开中断控制器、`dma` 表、`system` 表、打开加速器。
    /// 中断控制器与加速器只在已注册时打开，它们的句柄由上下文长期持有。
    pub fn install(&self) {
        self.install_hal();
        self.open_system_handle(&self.pic_handle, PIC_DEVICE);
        self.install_dma();
        self.install_system();
        self.open_system_handle(&self.fft_handle, FFT_DEVICE);
        self.open_system_handle(&self.aes_handle, AES_DEVICE);
        self.open_system_handle(&self.sha256_handle, SHA256_DEVICE);
    }

    /// 安装 `hal` 表中的驱动
    pub fn install_hal(&self) {
        log::info!("device: installing {} hal drivers", self.hal.len());
        self.hal.install_all();
    }

    /// 安装 `dma` 表中的通道
    pub fn install_dma(&self) {
        log::info!("device: installing {} dma channels", self.dma.capacity());
        self.dma.channels().install_all();
    }

    /// 安装 `system` 表中的驱动
    pub fn install_system(&self) {
        log::info!("device: installing {} system drivers", self.system.len());
        self.system.install_all();
    }

    /// 按名字打开设备
    ///
    /// 依次在 `system`、`hal`、`custom` 表中查找，第一张含有该名字的表决定结果，
    /// 被拒绝时不会继续查找后面的表。
    ///
    /// # Errors
    /// - [`DeviceError::NotFound`]：没有这个名字
    /// - [`DeviceError::Unavailable`]：驱动拒绝打开
    /// - [`DeviceError::TooManyHandles`]：句柄表已满，驱动已被关闭
    pub fn open(&self, name: &str) -> Result<Handle, DeviceError> {
        let reg = if self.system.contains(name) {
            self.system.find_free_driver(name)?
        } else if self.hal.contains(name) {
            self.hal.find_free_driver(name)?
        } else {
            self.custom.find_free_driver(name)?
        };
        self.alloc_file(reg)
    }

    /// 从设备读取
    ///
    /// 支持 UART、I2C 从设备、SPI 从设备和文件。
    ///
    /// # Errors
    /// 句柄无效返回 [`DeviceError::BadHandle`]，其它类别返回 [`DeviceError::NotSupported`]。
    pub fn read(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let file = self.handles.get(handle)?;
        match file.driver() {
            DriverInstance::Uart(uart) => Ok(uart.read(buf)),
            DriverInstance::I2cDevice(device) => Ok(device.read(buf)),
            DriverInstance::SpiDevice(device) => Ok(device.read(buf)),
            DriverInstance::File(driver) => Ok(driver.read(buf)),
            _ => Err(DeviceError::NotSupported),
        }
    }

    /// 向设备写入，支持的类别同 [`DeviceContext::read`]
    pub fn write(&self, handle: Handle, buf: &[u8]) -> Result<usize, DeviceError> {
        let file = self.handles.get(handle)?;
        match file.driver() {
            DriverInstance::Uart(uart) => Ok(uart.write(buf)),
            DriverInstance::I2cDevice(device) => Ok(device.write(buf)),
            DriverInstance::SpiDevice(device) => Ok(device.write(buf)),
            DriverInstance::File(driver) => Ok(driver.write(buf)),
            _ => Err(DeviceError::NotSupported),
        }
    }

    /// 向自定义驱动发送控制命令，返回写入 `read` 的字节数
    ///
    /// # Errors
    /// 句柄无效返回 [`DeviceError::BadHandle`]，非自定义驱动返回 [`DeviceError::NotSupported`]。
    pub fn control(
        &self,
        handle: Handle,
        code: u32,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<usize, DeviceError> {
        let file = self.handles.get(handle)?;
        match file.driver() {
            DriverInstance::Custom(custom) => Ok(custom.control(code, write, read)),
            _ => Err(DeviceError::NotSupported),
        }
    }

    /// 关闭句柄
    ///
    /// 调用驱动的 `close`；DMA 通道随后把许可还给通道池。
    ///
    /// # Errors
    /// 句柄无效或已关闭时返回 [`DeviceError::BadHandle`]。
    pub fn close(&self, handle: Handle) -> Result<(), DeviceError> {
        let file = self.handles.begin_close(handle)?;
        self.teardown(&file);
        drop(file);
        self.handles.finish_close(handle);
        log::debug!("device: handle {} closed", handle);
        Ok(())
    }

    /// 向 custom 表安装一个自定义驱动
    ///
    /// # Errors
    /// 同名驱动已存在时返回 [`DeviceError::AlreadyExists`]。
    ///
    /// # Panics
    /// custom 表已满时 panic。
    pub fn install_custom_driver(
        &self,
        name: &str,
        driver: Arc<dyn CustomDriver>,
    ) -> Result<(), DeviceError> {
        self.custom.install(name, DriverInstance::Custom(driver))?;
        log::info!("device: custom driver {} installed", name);
        Ok(())
    }

    /// 当前打开的句柄数
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// `hal` 表
    pub fn hal(&self) -> &RegistryTable {
        &self.hal
    }

    /// `system` 表
    pub fn system(&self) -> &RegistryTable {
        &self.system
    }

    /// custom 表
    pub fn custom(&self) -> &CustomTable {
        &self.custom
    }

    /// 句柄表
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// DMA 通道池
    pub fn dma(&self) -> &DmaPool {
        &self.dma
    }

    /// IRQ 回调表
    pub fn pic(&self) -> &PicTable {
        &self.pic
    }

    /// 解析类型化接口收到的句柄
    pub(crate) fn expect_file(&self, handle: Handle) -> Arc<FileObject> {
        match self.handles.get(handle) {
            Ok(file) => file,
            Err(_) => panic!("device: handle {} is not open", handle),
        }
    }

    /// 为一个已打开的注册表项分配句柄
    ///
    /// 句柄表满时拆除文件（驱动 `close` 恰好调用一次）并返回错误。
    pub(crate) fn alloc_file(&self, reg: Arc<DriverRegistry>) -> Result<Handle, DeviceError> {
        let entry = reg.clone();
        match self.handles.alloc(Arc::new(FileObject::new(reg))) {
            Ok(handle) => {
                log::debug!("device: {} opened as handle {}", entry.name(), handle);
                Ok(handle)
            }
            Err(file) => {
                log::warn!(
                    "device: handle table full ({} slots), closing {}",
                    self.handles.capacity(),
                    entry.name()
                );
                self.teardown(&file);
                Err(DeviceError::TooManyHandles)
            }
        }
    }

    /// 把总线控制器派生出的从设备装入 custom 表，打开并分配句柄
    ///
    /// 从设备此后与普通设备相同：关闭后留在 custom 表中，可以按名字再次 `open`。
    pub(crate) fn attach_device(
        &self,
        name: &str,
        driver: DriverInstance,
    ) -> Result<Handle, DeviceError> {
        let reg = self.custom.install(name, driver)?;
        if !reg.driver().open() {
            log::debug!("device: {} refused to open", name);
            return Err(DeviceError::Unavailable);
        }
        self.alloc_file(reg)
    }

    pub(crate) fn pic_handle(&self) -> Handle {
        system_handle(&self.pic_handle, PIC_DEVICE)
    }

    pub(crate) fn fft_handle(&self) -> Handle {
        system_handle(&self.fft_handle, FFT_DEVICE)
    }

    pub(crate) fn aes_handle(&self) -> Handle {
        system_handle(&self.aes_handle, AES_DEVICE)
    }

    pub(crate) fn sha256_handle(&self) -> Handle {
        system_handle(&self.sha256_handle, SHA256_DEVICE)
    }

    fn teardown(&self, file: &FileObject) {
        file.driver().close();
        if file.driver_type() == DriverType::Dma {
            self.dma.release();
        }
    }

    fn open_system_handle(&self, slot: &OnceNonZeroUsize, name: &str) {
        if slot.get().is_some() {
            return;
        }
        match self.open(name) {
            Ok(handle) => {
                if slot.set(NonZeroUsize::from(handle)).is_err() {
                    let _ = self.close(handle);
                }
            }
            Err(DeviceError::NotFound) => log::debug!("device: {} not registered", name),
            Err(err) => log::warn!("device: failed to open {}: {:?}", name, err),
        }
    }
}

fn system_handle(slot: &OnceNonZeroUsize, name: &str) -> Handle {
    match slot.get().and_then(|raw| Handle::from_raw(raw.get())) {
        Some(handle) => handle,
        None => panic!("device: {} is not open, call DeviceContext::install first", name),
    }
}
