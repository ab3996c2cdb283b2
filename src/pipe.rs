//! # 协作者：管道

/// 管道的一端。读写都可能阻塞到对端就绪，
/// 阻塞与唤醒由实现方负责
pub trait Pipe: Send + Sync {
    fn read(&self, buf: &mut [u8]) -> usize;

    fn write(&self, buf: &[u8]) -> usize;

    /// 关闭本端；`write_end`表明关闭的是否写端
    fn close(&self, write_end: bool);
}
