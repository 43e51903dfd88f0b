//! 驱动注册表
//!
//! 三张静态表（`hal`、`dma`、`system`）在构建 [`DeviceContext`](crate::DeviceContext)
//! 时一次性填充；一张容量固定的动态表（`custom`）在运行时追加。
//! 同一张表内名字唯一，查找是按注册顺序的线性扫描。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use sync::SpinMutex;

use crate::driver::{DriverInstance, DriverType};
use crate::error::DeviceError;

/// 驱动注册表项
pub struct DriverRegistry {
    name: String,
    driver: DriverInstance,
}

impl DriverRegistry {
    /// 创建注册表项
    pub fn new(name: &str, driver: DriverInstance) -> Self {
        Self {
            name: String::from(name),
            driver,
        }
    }

    /// 设备名，例如 `/dev/uart1`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设备类别
    pub fn driver_type(&self) -> DriverType {
        self.driver.driver_type()
    }

    /// 驱动实例
    pub fn driver(&self) -> &DriverInstance {
        &self.driver
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("name", &self.name)
            .field("type", &self.driver_type())
            .finish()
    }
}

/// 按名字打开：找到同名项后调用其 `open`。
///
/// 名字匹配但 `open` 拒绝时返回 [`DeviceError::Unavailable`]，不排队、不继续扫描。
fn open_matching<'a>(
    mut entries: impl Iterator<Item = &'a Arc<DriverRegistry>>,
    name: &str,
) -> Result<Arc<DriverRegistry>, DeviceError> {
    let entry = entries
        .find(|entry| entry.name() == name)
        .ok_or(DeviceError::NotFound)?;
    if entry.driver().open() {
        Ok(entry.clone())
    } else {
        log::debug!("device: {} refused to open", name);
        Err(DeviceError::Unavailable)
    }
}

/// 静态驱动注册表
///
/// 只在构建阶段可变，构建完成后只读。
#[derive(Debug, Default)]
pub struct RegistryTable {
    entries: Vec<Arc<DriverRegistry>>,
}

impl RegistryTable {
    /// 创建空表
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 追加一项，名字在本表内必须唯一
    pub fn register(&mut self, name: &str, driver: DriverInstance) -> Result<(), DeviceError> {
        if self.contains(name) {
            return Err(DeviceError::AlreadyExists);
        }
        self.entries.push(Arc::new(DriverRegistry::new(name, driver)));
        Ok(())
    }

    /// 表中是否有该名字
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name() == name)
    }

    /// 表项数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 表是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按注册顺序遍历表项
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DriverRegistry>> {
        self.entries.iter()
    }

    /// 对每一项调用 `install`
    pub fn install_all(&self) {
        for entry in &self.entries {
            entry.driver().install();
        }
    }

    /// 查找并打开名为 `name` 的驱动
    pub fn find_free_driver(&self, name: &str) -> Result<Arc<DriverRegistry>, DeviceError> {
        open_matching(self.entries.iter(), name)
    }
}

/// 动态（custom）驱动表
///
/// 容量固定，只增不减。追加由内部锁串行化；超出容量是启动配置错误，直接 panic。
pub struct CustomTable {
    entries: SpinMutex<Vec<Arc<DriverRegistry>>>,
    capacity: usize,
}

impl CustomTable {
    /// 创建容量为 `capacity` 的空表
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: SpinMutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// 追加一项并返回它
    ///
    /// # Panics
    /// 表已满时 panic。
    pub fn install(
        &self,
        name: &str,
        driver: DriverInstance,
    ) -> Result<Arc<DriverRegistry>, DeviceError> {
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry.name() == name) {
            return Err(DeviceError::AlreadyExists);
        }
        if entries.len() >= self.capacity {
            panic!("device: max custom drivers ({}) exceeded", self.capacity);
        }
        let entry = Arc::new(DriverRegistry::new(name, driver));
        entries.push(entry.clone());
        Ok(entry)
    }

    /// 查找并打开名为 `name` 的驱动
    ///
    /// `open` 在表锁之外调用。
    pub fn find_free_driver(&self, name: &str) -> Result<Arc<DriverRegistry>, DeviceError> {
        let snapshot: Vec<Arc<DriverRegistry>> = self
            .entries
            .lock()
            .iter()
            .filter(|entry| entry.name() == name)
            .cloned()
            .collect();
        open_matching(snapshot.iter(), name)
    }

    /// 已安装的项数
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// 表是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 表容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for CustomTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
