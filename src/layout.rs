//! # 磁盘数据结构层
//!
//! Packed 文件把直接块槽位重用成 (引用编号, 长度) 的打包编码：
//! 高 24 位是编号，低 8 位是长度。
//! 此布局须与既有磁盘镜像逐位兼容。

use alloc::string::String;
use core::fmt;

use crate::node::{NodeKind, Stat};

/// inode 的直接块槽位数
pub const NDIRECT: usize = 12;

/// 长度字段占用的低位
const LEN_BITS: u32 = 8;
const LEN_MASK: u32 = (1 << LEN_BITS) - 1;

/// 打包进单个块地址字段的 (编号, 长度) 对
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedAddr {
    pub number: u32,
    pub len: u8,
}

impl PackedAddr {
    /// 编号可用的位宽
    pub const NUMBER_BITS: u32 = u32::BITS - LEN_BITS;

    /// 组合成字段值；编号超出位宽属于编程错误
    #[inline]
    pub fn encode(self) -> u32 {
        assert!(
            self.number < 1 << Self::NUMBER_BITS,
            "packed number out of range"
        );
        (self.number << LEN_BITS) | u32::from(self.len)
    }

    #[inline]
    pub fn decode(field: u32) -> Self {
        Self {
            number: field >> LEN_BITS,
            len: (field & LEN_MASK) as u8,
        }
    }
}

/// 诊断输出的载体：inode 元数据加非零直接块槽位的只读快照，
/// 交给哪个输出口由调用方决定
pub struct NodeReport {
    label: String,
    stat: Stat,
    addrs: [u32; NDIRECT],
}

impl NodeReport {
    pub fn new(label: &str, stat: Stat, addrs: [u32; NDIRECT]) -> Self {
        Self {
            label: String::from(label),
            stat,
            addrs,
        }
    }
}

impl fmt::Display for NodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FILE NAME: {}", self.label)?;
        writeln!(f, "INODE NUM: {}", self.stat.ino)?;
        writeln!(f, "FILE TYPE: {}", type_label(self.stat.kind))?;
        writeln!(f, "FILE SIZE: {} Bytes", self.stat.size)?;
        writeln!(f, "DIRECT BLOCK INFO:")?;

        // 为 0 的槽位未被使用，跳过
        for (index, &field) in self.addrs.iter().enumerate().filter(|(_, &field)| field != 0) {
            match self.stat.kind {
                NodeKind::Regular => writeln!(f, "[{index}] {field}")?,
                NodeKind::Packed => {
                    let addr = PackedAddr::decode(field);
                    writeln!(
                        f,
                        "[{index}] {field} (num: {}, length: {})",
                        addr.number, addr.len
                    )?;
                }
                _ => {}
            }
        }

        // 结尾空两行，与既有诊断输出保持一致
        writeln!(f)?;
        writeln!(f)
    }
}

fn type_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Directory => "DIR",
        NodeKind::Regular => "FILE",
        NodeKind::Device => "DEV",
        NodeKind::Packed => "PACKED",
        NodeKind::Unknown => "NO TYPE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for number in [0, 1, 18, 0xFF_FFFF] {
            for len in [0u8, 3, 255] {
                let addr = PackedAddr { number, len };
                assert_eq!(PackedAddr::decode(addr.encode()), addr);
            }
        }
    }

    #[test]
    fn known_field() {
        assert_eq!(
            PackedAddr::decode(0x0000_1203),
            PackedAddr { number: 18, len: 3 }
        );
        assert_eq!(PackedAddr { number: 18, len: 3 }.encode(), 0x0000_1203);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn oversized_number() {
        PackedAddr {
            number: 1 << PackedAddr::NUMBER_BITS,
            len: 0,
        }
        .encode();
    }

    #[test]
    fn report_rendering() {
        let mut addrs = [0; NDIRECT];
        addrs[0] = 0x1203;
        addrs[7] = PackedAddr {
            number: 100,
            len: 255,
        }
        .encode();
        let stat = Stat {
            ino: 9,
            kind: NodeKind::Packed,
            size: 1539,
        };

        let text = NodeReport::new("data.cs", stat, addrs).to_string();
        assert!(text.contains("FILE NAME: data.cs"));
        assert!(text.contains("INODE NUM: 9"));
        assert!(text.contains("FILE TYPE: PACKED"));
        assert!(text.contains("FILE SIZE: 1539 Bytes"));
        assert!(text.contains("[0] 4611 (num: 18, length: 3)"));
        assert!(text.contains("[7] 25855 (num: 100, length: 255)"));
        assert!(text.ends_with("(num: 100, length: 255)\n\n\n"));

        let plain = NodeReport::new(
            "plain",
            Stat {
                kind: NodeKind::Regular,
                ..stat
            },
            addrs,
        )
        .to_string();
        assert!(plain.contains("FILE TYPE: FILE"));
        assert!(plain.contains("[0] 4611\n"));
        assert!(!plain.contains("num:"));
    }
}
