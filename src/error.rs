/// 打开文件层的统一错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 打开文件表没有空槽
    Exhausted,
    NotReadable,
    NotWritable,
    /// 操作对该类文件无意义
    Unsupported,
    /// Packed 文件的长度字段容不下本次分配
    AllocOverflow,
    /// 下层读写失败
    Io,
}
