//! 停等协议（交替位 ARQ）
//!
//! 发送方同一时刻最多只有一个未确认数据包；序号在 0/1 之间交替。
//! 收到损坏的或 ack 不符的确认时立即重传（视为隐式否定确认）。

use std::any::Any;
use std::collections::VecDeque;

use tracing::{debug, info};

use super::{ACK_PAYLOAD, TransportEndpoint};
use crate::net::{NetApi, Packet};

fn flip(bit: i32) -> i32 {
    (bit + 1) % 2
}

#[derive(Debug, Clone)]
enum SenderState {
    Idle,
    WaitingForAck { outstanding: Packet },
}

/// 停等发送方
#[derive(Debug)]
pub struct StopWaitSender {
    name: String,
    timeout: f64,
    /// 下一个（或当前未确认）数据包的序号
    seq: i32,
    /// 最近一次接受的对端 ack
    last_ack: i32,
    state: SenderState,
    pending: VecDeque<Vec<u8>>,
}

impl StopWaitSender {
    pub fn new(name: impl Into<String>, timeout: f64) -> Self {
        Self {
            name: name.into(),
            timeout,
            seq: 0,
            last_ack: 0,
            state: SenderState::Idle,
            pending: VecDeque::new(),
        }
    }

    pub fn seq(&self) -> i32 {
        self.seq
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.state, SenderState::WaitingForAck { .. })
    }

    pub fn outstanding(&self) -> Option<&Packet> {
        match &self.state {
            SenderState::Idle => None,
            SenderState::WaitingForAck { outstanding } => Some(outstanding),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn expected_ack(&self) -> i32 {
        flip(self.seq)
    }

    fn send_new(&mut self, payload: Vec<u8>, net: &mut dyn NetApi) {
        let pkt = Packet::new(self.seq, self.last_ack, payload);
        debug!(sender = %self.name, %pkt, "发送数据包");
        net.send_to_network(&pkt);
        self.state = SenderState::WaitingForAck { outstanding: pkt };
        net.start_timer(self.timeout);
    }
}

impl TransportEndpoint for StopWaitSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_application_send(&mut self, payload: Vec<u8>, net: &mut dyn NetApi) {
        if self.is_waiting() {
            debug!(
                sender = %self.name,
                data = %String::from_utf8_lossy(&payload),
                queued = self.pending.len() + 1,
                "等待确认中，新数据入队"
            );
            self.pending.push_back(payload);
            return;
        }
        self.send_new(payload, net);
    }

    #[tracing::instrument(skip_all, fields(sender = %self.name, seq = pkt.seq(), ack = pkt.ack()))]
    fn handle_network_receive(&mut self, pkt: Packet, net: &mut dyn NetApi) {
        let SenderState::WaitingForAck { outstanding } = &self.state else {
            debug!("没有未确认数据包，忽略 ACK");
            return;
        };

        if pkt.is_corrupt() || pkt.ack() != self.expected_ack() {
            let outstanding = outstanding.clone();
            info!(
                corrupt = pkt.is_corrupt(),
                expected = self.expected_ack(),
                "ACK 无效，重传未确认数据包"
            );
            net.resend_to_network(&outstanding);
            net.stop_timer();
            net.start_timer(self.timeout);
            return;
        }

        debug!("ACK 正确");
        self.seq = self.expected_ack();
        self.last_ack = pkt.ack();
        self.state = SenderState::Idle;
        net.stop_timer();

        // 直接发送队首，绕过入队检查，保证先来的数据先发
        if let Some(next) = self.pending.pop_front() {
            self.send_new(next, net);
        }
    }

    fn handle_timer_expiry(&mut self, net: &mut dyn NetApi) {
        let Some(outstanding) = self.outstanding().cloned() else {
            debug!(sender = %self.name, "空闲状态下定时器超时，忽略");
            return;
        };
        info!(sender = %self.name, pkt = %outstanding, "⏰ 超时重传");
        net.resend_to_network(&outstanding);
        net.start_timer(self.timeout);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 停等接收方
///
/// 可选的 ACK 保活：启用后接收方在发出第一个 ACK 后启动自己的定时器，
/// 每次超时都无条件重发最后一个 ACK 并重新启动。
#[derive(Debug)]
pub struct StopWaitReceiver {
    name: String,
    expected_seq: i32,
    last_ack: Option<Packet>,
    keepalive: Option<f64>,
    keepalive_armed: bool,
}

impl StopWaitReceiver {
    pub fn new(name: impl Into<String>, keepalive: Option<f64>) -> Self {
        Self {
            name: name.into(),
            expected_seq: 0,
            last_ack: None,
            keepalive,
            keepalive_armed: false,
        }
    }

    pub fn expected_seq(&self) -> i32 {
        self.expected_seq
    }

    pub fn last_ack(&self) -> Option<&Packet> {
        self.last_ack.as_ref()
    }

    /// 重复确认：最后一个 ACK；还没有接受过数据时确认“仍在等待 expected_seq”
    fn repeat_ack(&self, seq: i32) -> Packet {
        self.last_ack
            .clone()
            .unwrap_or_else(|| Packet::new(seq, self.expected_seq, ACK_PAYLOAD))
    }
}

impl TransportEndpoint for StopWaitReceiver {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_application_send(&mut self, payload: Vec<u8>, _net: &mut dyn NetApi) {
        debug!(
            receiver = %self.name,
            data = %String::from_utf8_lossy(&payload),
            "接收方不发起数据，丢弃应用层消息"
        );
    }

    #[tracing::instrument(skip_all, fields(receiver = %self.name, seq = pkt.seq(), ack = pkt.ack()))]
    fn handle_network_receive(&mut self, pkt: Packet, net: &mut dyn NetApi) {
        if pkt.seq() != self.expected_seq {
            debug!(expected = self.expected_seq, "重复或序号无效，重发上一个 ACK");
            let ack = self.repeat_ack(pkt.seq());
            net.resend_to_network(&ack);
            return;
        }

        if pkt.is_corrupt() {
            debug!("数据包损坏，重发上一个 ACK");
            let ack = self.repeat_ack(pkt.seq());
            net.resend_to_network(&ack);
            return;
        }

        net.deliver_to_application(pkt.payload());
        let ack = Packet::new(pkt.seq(), flip(self.expected_seq), ACK_PAYLOAD);
        debug!(%ack, "数据包完好，返回 ACK");
        net.send_to_network(&ack);
        self.expected_seq = ack.ack();
        self.last_ack = Some(ack);

        if let (Some(period), false) = (self.keepalive, self.keepalive_armed) {
            self.keepalive_armed = true;
            net.start_timer(period);
        }
    }

    fn handle_timer_expiry(&mut self, net: &mut dyn NetApi) {
        let Some(period) = self.keepalive else {
            debug!(receiver = %self.name, "未启用保活，忽略定时器");
            return;
        };
        if let Some(ack) = self.last_ack.clone() {
            debug!(receiver = %self.name, %ack, "保活：重发最后一个 ACK");
            net.resend_to_network(&ack);
        }
        net.start_timer(period);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
