use crate::net::EndpointId;
use serde::{Deserialize, Serialize};

/// 损坏注入作用的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptField {
    Payload,
    Seq,
    Ack,
}

/// 追踪事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 应用层消息到达某个端点
    AppArrival { endpoint: EndpointId },
    /// 端点把数据包交给网络
    Send {
        from: EndpointId,
        seq: i32,
        ack: i32,
        /// 是否为重传（超时或否定确认触发）
        retrans: bool,
    },
    /// 网络丢弃数据包
    Lost { from: EndpointId, seq: i32, ack: i32 },
    /// 网络损坏了数据包的某个字段
    Corrupt { from: EndpointId, field: CorruptField },
    /// 数据包到达对端（NetworkDelivery 事件执行）
    Arrive {
        to: EndpointId,
        seq: i32,
        ack: i32,
        corrupt: bool,
    },
    /// 载荷交付给应用层
    AppDeliver { endpoint: EndpointId, data: String },
    TimerStart { endpoint: EndpointId, expires: f64 },
    TimerStop { endpoint: EndpointId },
    TimerExpiry { endpoint: EndpointId },
    /// 已有定时器时再次启动（被忽略）
    TimerConflict { endpoint: EndpointId },
    /// 停止一个不存在的定时器（被忽略）
    TimerAbsent { endpoint: EndpointId },
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（和 `SimTime.0` 同口径）
    pub t: f64,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, t: f64, kind: TraceEventKind) {
        self.events.push(TraceEvent { t, kind });
    }
}
