//! 端点标识符
//!
//! 仿真中固定只有一对端点：指定的发送方与接收方。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 端点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointId {
    Sender,
    Receiver,
}

impl EndpointId {
    pub const ALL: [EndpointId; 2] = [EndpointId::Sender, EndpointId::Receiver];

    /// 对端（“另一个”端点）
    pub fn peer(self) -> EndpointId {
        match self {
            EndpointId::Sender => EndpointId::Receiver,
            EndpointId::Receiver => EndpointId::Sender,
        }
    }

    /// 用作数组下标
    pub fn index(self) -> usize {
        match self {
            EndpointId::Sender => 0,
            EndpointId::Receiver => 1,
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointId::Sender => f.write_str("sender"),
            EndpointId::Receiver => f.write_str("receiver"),
        }
    }
}
