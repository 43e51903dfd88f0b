//! 块存储设备模块

use crate::context::DeviceContext;
use crate::driver::Driver;
use crate::handle::Handle;

/// 块存储驱动程序接口
pub trait BlockStorageDriver: Driver {
    /// 单次读写的块大小（字节）
    fn rw_block_size(&self) -> u32;

    /// 总块数
    fn blocks_count(&self) -> u32;

    /// 从 `start_block` 起读取 `blocks_count` 块到 `buf`
    ///
    /// `buf` 长度至少为 `blocks_count * rw_block_size()`。
    fn read_blocks(&self, start_block: u32, blocks_count: u32, buf: &mut [u8]);

    /// 从 `start_block` 起写入 `blocks_count` 块
    fn write_blocks(&self, start_block: u32, blocks_count: u32, buf: &[u8]);
}

impl DeviceContext {
    /// 块大小
    pub fn block_rw_block_size(&self, handle: Handle) -> u32 {
        expect_driver!(self, handle, BlockStorage).rw_block_size()
    }

    /// 总块数
    pub fn block_blocks_count(&self, handle: Handle) -> u32 {
        expect_driver!(self, handle, BlockStorage).blocks_count()
    }

    /// 读取若干块
    pub fn block_read_blocks(
        &self,
        handle: Handle,
        start_block: u32,
        blocks_count: u32,
        buf: &mut [u8],
    ) {
        expect_driver!(self, handle, BlockStorage).read_blocks(start_block, blocks_count, buf);
    }

    /// 写入若干块
    pub fn block_write_blocks(
        &self,
        handle: Handle,
        start_block: u32,
        blocks_count: u32,
        buf: &[u8],
    ) {
        expect_driver!(self, handle, BlockStorage).write_blocks(start_block, blocks_count, buf);
    }
}
