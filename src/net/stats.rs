//! 统计信息
//!
//! 定义仿真运行过程中的计数器以及应用层交付记录。

use super::id::EndpointId;
use crate::sim::SimTime;

/// 单个端点的统计
#[derive(Debug, Default, Clone)]
pub struct EndpointStats {
    pub app_arrivals: u64,
    pub packets_sent: u64,
    pub retransmissions: u64,
    pub delivered: u64,
}

/// 一次应用层交付
#[derive(Debug, Clone)]
pub struct Delivery {
    pub time: SimTime,
    pub endpoint: EndpointId,
    pub payload: Vec<u8>,
}

/// 网络统计信息
#[derive(Debug, Default)]
pub struct Stats {
    pub lost_pkts: u64,
    pub corrupted_pkts: u64,
    pub corrupted_payload: u64,
    pub corrupted_seq: u64,
    pub corrupted_ack: u64,
    pub timer_conflicts: u64,
    pub timer_absent: u64,
    pub events: u64,
    pub endpoints: [EndpointStats; 2],
    pub deliveries: Vec<Delivery>,
}

impl Stats {
    pub fn endpoint(&self, id: EndpointId) -> &EndpointStats {
        &self.endpoints[id.index()]
    }

    pub(crate) fn endpoint_mut(&mut self, id: EndpointId) -> &mut EndpointStats {
        &mut self.endpoints[id.index()]
    }

    /// 某个端点收到的全部应用层载荷（按交付顺序）
    pub fn delivered_to(&self, id: EndpointId) -> Vec<&[u8]> {
        self.deliveries
            .iter()
            .filter(|d| d.endpoint == id)
            .map(|d| d.payload.as_slice())
            .collect()
    }

    pub fn retransmissions(&self) -> u64 {
        self.endpoints.iter().map(|e| e.retransmissions).sum()
    }
}
