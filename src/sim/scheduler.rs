//! 事件调度器
//!
//! 维护当前仿真时间与按时间排序的事件队列。

use super::event::{Event, EventKind};
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// 事件调度器：维护当前时间与事件队列。
#[derive(Debug, Default)]
pub struct Scheduler {
    now: SimTime,
    next_seq: u64,
    pub(super) q: BinaryHeap<ScheduledEvent>,
}

impl Scheduler {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(kind = ?ev.kind, endpoint = %ev.endpoint, schedule_at = %at))]
    pub fn schedule(&mut self, at: SimTime, ev: Event) {
        let seq = self.next_seq;
        trace!(now = %self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent { at, seq, ev });

        debug!(queue_size = self.q.len(), "事件已加入队列");
    }

    /// 最早事件的执行时间
    pub fn peek_time(&self) -> Option<SimTime> {
        self.q.peek().map(|top| top.at)
    }

    /// 取出最早的事件，并把当前时间推进到该事件的时间
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        let item = self.q.pop()?;
        self.now = item.at;
        Some(item)
    }

    /// 按执行顺序列出所有待处理事件（诊断用）
    pub fn peek_all(&self) -> Vec<&ScheduledEvent> {
        let mut all: Vec<&ScheduledEvent> = self.q.iter().collect();
        all.sort_by(|a, b| b.cmp(a));
        all
    }

    /// 删除所有满足条件的事件，返回删除数量
    pub fn cancel_matching<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&ScheduledEvent) -> bool,
    {
        let before = self.q.len();
        self.q.retain(|item| !pred(item));
        let removed = before - self.q.len();
        trace!(removed, remaining = self.q.len(), "取消事件");
        removed
    }

    /// 队列中最晚的非定时器事件时间
    pub fn latest_non_timer_time(&self) -> Option<SimTime> {
        self.q
            .iter()
            .filter(|item| item.ev.kind != EventKind::TimerExpiry)
            .map(|item| item.at)
            .max()
    }
}
