//! # 设备登记表
//!
//! 设备号到读写能力的定容映射；启动时登记一次，此后只读。

use alloc::sync::Arc;

use spin::Once;

/// 可登记的设备数
pub const NDEV: usize = 10;

pub trait CharDevice: Send + Sync {
    fn read(&self, buf: &mut [u8]) -> usize;
    fn write(&self, buf: &[u8]) -> usize;
}

pub struct DeviceTable {
    slots: [Once<Arc<dyn CharDevice>>; NDEV],
}

impl DeviceTable {
    pub const fn new() -> Self {
        const VACANT: Once<Arc<dyn CharDevice>> = Once::new();
        Self {
            slots: [VACANT; NDEV],
        }
    }

    /// 启动时登记设备；重复登记同一设备号属于编程错误
    pub fn register(&self, id: usize, device: Arc<dyn CharDevice>) {
        assert!(
            !self.slots[id].is_completed(),
            "device {id} registered twice"
        );
        self.slots[id].call_once(|| device);
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<Arc<dyn CharDevice>> {
        self.slots.get(id)?.get().cloned()
    }
}

impl Default for DeviceTable {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
