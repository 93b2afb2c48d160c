//! 数据包类型
//!
//! 定义传输层数据包及其校验和。数据包构造后不可变：损坏注入总是基于副本
//! 生成一个新的数据包，原始数据包仍可用于重传。

use std::fmt;

/// 被损坏的 seq/ack 字段会被改写成这个哨兵值（正常序号永远不会为负）。
pub const CORRUPT_SENTINEL: i32 = -99_999;

/// 传输层数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    seq: i32,
    ack: i32,
    checksum: u16,
    payload: Vec<u8>,
}

/// 16 位回绕求和：seq + ack + 所有载荷字节
fn field_sum(seq: i32, ack: i32, payload: &[u8]) -> u16 {
    payload.iter().fold(
        (seq as u16).wrapping_add(ack as u16),
        |acc, &b| acc.wrapping_add(b as u16),
    )
}

impl Packet {
    /// 创建数据包并计算校验和
    pub fn new(seq: i32, ack: i32, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        let checksum = !field_sum(seq, ack, &payload);
        Self {
            seq,
            ack,
            checksum,
            payload,
        }
    }

    pub fn seq(&self) -> i32 {
        self.seq
    }

    pub fn ack(&self) -> i32 {
        self.ack
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// 校验：checksum + 重新计算的和 ≡ 0xFFFF 时视为完好
    pub fn is_corrupt(&self) -> bool {
        self.checksum
            .wrapping_add(field_sum(self.seq, self.ack, &self.payload))
            != u16::MAX
    }

    /// 派生一个 seq 被改写的副本（保留原校验和）
    pub(crate) fn with_seq(&self, seq: i32) -> Packet {
        Packet {
            seq,
            ..self.clone()
        }
    }

    /// 派生一个 ack 被改写的副本（保留原校验和）
    pub(crate) fn with_ack(&self, ack: i32) -> Packet {
        Packet {
            ack,
            ..self.clone()
        }
    }

    /// 派生一个载荷被替换的副本（保留原校验和）
    pub(crate) fn with_payload(&self, payload: Vec<u8>) -> Packet {
        Packet {
            payload,
            ..self.clone()
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[seq={} ack={} chk={} data={:?}]",
            self.seq,
            self.ack,
            self.checksum,
            String::from_utf8_lossy(&self.payload)
        )
    }
}
