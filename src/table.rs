//! # 打开文件表层
//!
//! 全系统共享一张定容的打开文件表：
//! 槽位凭引用计数复用，句柄是稳定的表内下标。
//!
//! 表锁只保护槽位簿记；
//! 管道、inode、设备的操作都可能阻塞，一律在锁外进行。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use enumflags2::{bitflags, BitFlags};
use spin::Mutex;

use crate::device::DeviceTable;
use crate::layout::NodeReport;
use crate::node::{Node, Stat};
use crate::oplog::{Op, Oplog};
use crate::pipe::Pipe;
use crate::{Error, BLOCK_SIZE, MAX_OP_BLOCKS, NFILE};

pub struct FileTable {
    slots: Mutex<[FileSlot; NFILE]>,
    devices: Arc<DeviceTable>,
    oplog: Arc<dyn Oplog>,
}

/// 打开文件的句柄：表内下标，随`dup`共享
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(usize);

#[derive(Default)]
struct FileSlot {
    /// 引用此槽位的描述符个数；0 即空槽
    refs: usize,
    file: Option<Arc<OpenFile>>,
}

struct OpenFile {
    kind: FileKind,
    readable: bool,
    writable: bool,
    /// 顺序读写游标，只按实际传输量推进。
    /// 同一句柄的并发使用得由调用方自行串行化
    offset: AtomicUsize,
}

pub enum FileKind {
    Pipe(Arc<dyn Pipe>),
    Node(Arc<dyn Node>),
    /// 设备号，I/O 经设备登记表转发
    Device(usize),
}

#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    /// 只写
    WRONLY = 0b01,
    /// 读写兼备
    RDWR   = 0b10,
}

impl OpenFlag {
    // enumflags2拒绝值为0的标志
    /// 只读
    pub const RDONLY: u32 = 0;

    #[inline]
    pub fn read_only() -> BitFlags<OpenFlag> {
        BitFlags::from_bits_truncate(Self::RDONLY)
    }
}

impl OpenFile {
    fn new(kind: FileKind, flags: BitFlags<OpenFlag>) -> Self {
        let [readable, writable] = if flags.is_empty() {
            [true, false]
        } else if flags.contains(OpenFlag::WRONLY) {
            [false, true]
        } else {
            [true, true]
        };

        Self {
            kind,
            readable,
            writable,
            offset: AtomicUsize::new(0),
        }
    }
}

impl FileTable {
    pub fn new(devices: Arc<DeviceTable>, oplog: Arc<dyn Oplog>) -> Self {
        Self {
            slots: Mutex::new(core::array::from_fn(|_| FileSlot::default())),
            devices,
            oplog,
        }
    }

    /// 认领一个空槽。表满时报 [`Error::Exhausted`]，
    /// 传入的负载随之丢弃——调用方还要用就传克隆
    pub fn alloc(&self, kind: FileKind, flags: BitFlags<OpenFlag>) -> Result<FileHandle, Error> {
        let file = Arc::new(OpenFile::new(kind, flags));
        let mut slots = self.slots.lock();

        let Some((index, slot)) = slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.refs == 0)
        else {
            log::warn!("open file table exhausted");
            return Err(Error::Exhausted);
        };

        slot.refs = 1;
        slot.file = Some(file);
        Ok(FileHandle(index))
    }

    /// 为句柄增加一个引用
    pub fn dup(&self, handle: FileHandle) -> FileHandle {
        let mut slots = self.slots.lock();
        let slot = &mut slots[handle.0];
        assert!(slot.refs >= 1, "dup of a closed file");
        slot.refs += 1;
        handle
    }

    /// 归还一个引用；归零时槽位立即可复用，收尾在表锁之外进行
    pub fn close(&self, handle: FileHandle) {
        let mut slots = self.slots.lock();
        let slot = &mut slots[handle.0];
        assert!(slot.refs >= 1, "close of a closed file");
        slot.refs -= 1;
        if slot.refs > 0 {
            return;
        }

        let file = slot.file.take().expect("occupied slot holds no file");
        drop(slots);

        // 管道收尾可能阻塞，inode 归还要进事务，都不能占着表锁
        match &file.kind {
            FileKind::Pipe(pipe) => pipe.close(file.writable),
            FileKind::Node(node) => {
                let _op = Op::begin(&*self.oplog);
                node.release();
            }
            FileKind::Device(_) => {}
        }
    }

    /// 读取文件元数据，只对 inode 文件有意义
    pub fn stat(&self, handle: FileHandle) -> Result<Stat, Error> {
        match &self.get(handle).kind {
            FileKind::Node(node) => Ok(node.stat()),
            _ => Err(Error::Unsupported),
        }
    }

    /// 从当前游标读取，返回实际读到的字节数，0 表示读尽
    pub fn read(&self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, Error> {
        let file = self.get(handle);
        if !file.readable {
            return Err(Error::NotReadable);
        }

        match &file.kind {
            FileKind::Pipe(pipe) => Ok(pipe.read(buf)),
            FileKind::Node(node) => {
                let len = node.read_at(file.offset.load(Ordering::Relaxed), buf);
                if len > 0 {
                    file.offset.fetch_add(len, Ordering::Relaxed);
                }
                Ok(len)
            }
            FileKind::Device(id) => {
                let device = self.devices.get(*id).ok_or(Error::Unsupported)?;
                Ok(device.read(buf))
            }
        }
    }

    /// 写入整个`buf`。inode 文件按事务容量分段提交；
    /// 出错时已提交的前缀量以 [`FileTable::offset`] 为准，错误值不说明
    pub fn write(&self, handle: FileHandle, buf: &[u8]) -> Result<usize, Error> {
        let file = self.get(handle);
        if !file.writable {
            return Err(Error::NotWritable);
        }

        match &file.kind {
            FileKind::Pipe(pipe) => Ok(pipe.write(buf)),
            FileKind::Node(node) => self.write_node(&file, node, buf),
            FileKind::Device(id) => {
                let device = self.devices.get(*id).ok_or(Error::Unsupported)?;
                Ok(device.write(buf))
            }
        }
    }

    /// 当前游标位置
    #[inline]
    pub fn offset(&self, handle: FileHandle) -> usize {
        self.get(handle).offset.load(Ordering::Relaxed)
    }

    /// 诊断输出：inode 元数据加直接块槽位内容，不改动任何状态
    pub fn describe(&self, handle: FileHandle, label: &str) -> Result<NodeReport, Error> {
        match &self.get(handle).kind {
            FileKind::Node(node) => Ok(NodeReport::new(label, node.stat(), node.addrs())),
            _ => Err(Error::Unsupported),
        }
    }

    fn write_node(
        &self,
        file: &OpenFile,
        node: &Arc<dyn Node>,
        buf: &[u8],
    ) -> Result<usize, Error> {
        // 单段不超过一个事务的容量：
        // 总块数里留出 inode 块、一个间接块、两块未对齐的余量，
        // 再对半分给位图等分配簿记
        const MAX_SEGMENT: usize = (MAX_OP_BLOCKS - 1 - 1 - 2) / 2 * BLOCK_SIZE;

        let mut written = 0;
        while written < buf.len() {
            let segment = &buf[written..usize::min(written + MAX_SEGMENT, buf.len())];

            let result = {
                let _op = Op::begin(&*self.oplog);
                node.write_at(file.offset.load(Ordering::Relaxed), segment)
            };

            match result {
                Ok(len) => {
                    if len > 0 {
                        file.offset.fetch_add(len, Ordering::Relaxed);
                    }
                    // 下层承诺：写不满必定经由错误路径返回
                    assert_eq!(len, segment.len(), "short write from the node layer");
                    written += len;
                }
                Err(Error::AllocOverflow) => {
                    log::error!("packed block length overflow");
                    return Err(Error::AllocOverflow);
                }
                Err(_) => return Err(Error::Io),
            }
        }
        Ok(written)
    }

    fn get(&self, handle: FileHandle) -> Arc<OpenFile> {
        let slots = self.slots.lock();
        let slot = &slots[handle.0];
        assert!(slot.refs >= 1, "stale file handle");
        slot.file.clone().expect("occupied slot holds no file")
    }
}
