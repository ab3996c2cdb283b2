//! # 协作者：内核 inode 句柄

use crate::layout::NDIRECT;
use crate::Error;

/// 磁盘文件句柄。各方法内部由 inode 锁串行化，
/// 上层只保证在表锁之外调用
pub trait Node: Send + Sync {
    /// 从`offset`读入`buf`，返回实际读到的字节数，0 表示读尽
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> usize;

    /// 把`buf`写到`offset`。
    /// 长度字段放不下新分配时报 [`Error::AllocOverflow`]，
    /// 其余失败报 [`Error::Io`]；
    /// 不允许写入量少于`buf.len()`却返回`Ok`
    fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize, Error>;

    fn stat(&self) -> Stat;

    /// 直接块槽位的原始内容，只用于诊断
    fn addrs(&self) -> [u32; NDIRECT];

    /// 归还 inode 引用。调用方保证处于日志事务之内
    fn release(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub ino: u64,
    pub kind: NodeKind,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    Regular,
    Device,
    /// 直接块槽位打包了 (编号, 长度) 的文件
    Packed,
    #[default]
    Unknown,
}
