#![cfg_attr(not(test), no_std)]

extern crate alloc;

/* 打开文件层的整体架构，自上而下 */

// 打开文件表层：全系统共享的打开文件对象，
// 引用计数、按类型分派读写、按事务容量分段落盘
mod table;
pub use table::{FileHandle, FileKind, FileTable, OpenFlag};

// 磁盘数据结构层：打包的块地址编码与诊断输出
mod layout;
pub use layout::{NodeReport, PackedAddr, NDIRECT};

// 协作者接口层：inode、管道、设备、日志由下层实现
mod node;
pub use node::{Node, NodeKind, Stat};

mod pipe;
pub use pipe::Pipe;

mod device;
pub use device::{CharDevice, DeviceTable, NDEV};

mod oplog;
pub use oplog::{Op, Oplog};

mod error;
pub use error::Error;

pub const BLOCK_SIZE: usize = 512;
/// 单个日志事务所能容纳的块数
pub const MAX_OP_BLOCKS: usize = 10;
/// 全系统可同时打开的文件数
pub const NFILE: usize = 64;
