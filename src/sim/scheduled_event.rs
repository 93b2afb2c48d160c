//! 调度事件
//!
//! 定义调度事件结构及其优先级比较。

use super::event::Event;
use super::time::SimTime;
use std::cmp::Ordering;
use std::fmt;

/// 调度事件，包含执行时间、序列号和事件对象。
///
/// 同一时刻的事件按序列号（即插入顺序）执行。
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
    pub(crate) ev: Event,
}

impl ScheduledEvent {
    pub fn at(&self) -> SimTime {
        self.at
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn event(&self) -> &Event {
        &self.ev
    }

    pub fn into_event(self) -> Event {
        self.ev
    }
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl fmt::Display for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EVENT(time={}, type={:?}, endpoint={}, pkt=",
            self.at, self.ev.kind, self.ev.endpoint
        )?;
        match &self.ev.packet {
            Some(pkt) => write!(f, "{pkt})"),
            None => f.write_str("[no data])"),
        }
    }
}
