use crate::net::{NetApi, Packet};
use crate::sim::SimTime;

/// 记录端点调用的 `NetApi`，用于单独测试协议状态机。
#[derive(Debug, Default)]
pub(crate) struct MockNet {
    pub now: f64,
    /// (packet, retrans)
    pub sent: Vec<(Packet, bool)>,
    pub delivered: Vec<Vec<u8>>,
    pub timer: Option<f64>,
    pub starts: usize,
    pub stops: usize,
    pub conflicts: usize,
    pub absent: usize,
}

impl MockNet {
    /// 模拟调度器弹出定时器事件
    pub fn fire_timer(&mut self) {
        assert!(self.timer.take().is_some(), "no timer armed");
    }

    pub fn take_sent(&mut self) -> Vec<(Packet, bool)> {
        std::mem::take(&mut self.sent)
    }
}

impl NetApi for MockNet {
    fn now(&self) -> SimTime {
        SimTime(self.now)
    }

    fn send_to_network(&mut self, pkt: &Packet) {
        self.sent.push((pkt.clone(), false));
    }

    fn resend_to_network(&mut self, pkt: &Packet) {
        self.sent.push((pkt.clone(), true));
    }

    fn deliver_to_application(&mut self, payload: &[u8]) {
        self.delivered.push(payload.to_vec());
    }

    fn start_timer(&mut self, delay: f64) {
        if self.timer.is_some() {
            self.conflicts += 1;
            return;
        }
        self.starts += 1;
        self.timer = Some(self.now + delay);
    }

    fn stop_timer(&mut self) {
        if self.timer.take().is_none() {
            self.absent += 1;
            return;
        }
        self.stops += 1;
    }
}
