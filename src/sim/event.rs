//! 仿真事件
//!
//! 定义三类事件：应用层到达、网络交付、定时器超时。

use crate::net::{EndpointId, Packet};
use serde::Serialize;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 应用层产生一条新消息
    ApplicationArrival,
    /// 网络把数据包交付给端点
    NetworkDelivery,
    /// 端点的重传定时器超时
    TimerExpiry,
}

/// 事件：作用于某个端点，网络交付事件携带数据包。
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub endpoint: EndpointId,
    pub packet: Option<Packet>,
}

impl Event {
    pub fn arrival(endpoint: EndpointId) -> Self {
        Self {
            kind: EventKind::ApplicationArrival,
            endpoint,
            packet: None,
        }
    }

    pub fn delivery(endpoint: EndpointId, packet: Packet) -> Self {
        Self {
            kind: EventKind::NetworkDelivery,
            endpoint,
            packet: Some(packet),
        }
    }

    pub fn timer(endpoint: EndpointId) -> Self {
        Self {
            kind: EventKind::TimerExpiry,
            endpoint,
            packet: None,
        }
    }

    pub fn is_timer_for(&self, endpoint: EndpointId) -> bool {
        self.kind == EventKind::TimerExpiry && self.endpoint == endpoint
    }
}
