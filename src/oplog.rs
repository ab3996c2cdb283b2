//! # 协作者：写前日志

/// 日志事务括号。`begin_op`可能阻塞，等日志腾出空间
pub trait Oplog: Send + Sync {
    fn begin_op(&self);
    fn end_op(&self);
}

/// 事务作用域，离开即`end_op`，保证成对
pub struct Op<'a>(&'a dyn Oplog);

impl<'a> Op<'a> {
    #[inline]
    pub fn begin(oplog: &'a dyn Oplog) -> Self {
        oplog.begin_op();
        Self(oplog)
    }
}

impl Drop for Op<'_> {
    #[inline]
    fn drop(&mut self) {
        self.0.end_op();
    }
}
