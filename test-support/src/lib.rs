//! 测试支持 crate
//!
//! 提供 Mock 实现和测试工具。
//! 在宿主机上运行测试时，用线程模拟 hart。

#![no_std]

extern crate std;

pub mod mock;
