//! 滑动窗口协议（流水线发送 + 累计确认）
//!
//! 发送方维护在途窗口 `[send_base, next_seq)`，整个窗口共用一个重传定时器；
//! 超时后重传窗口内全部数据包。接收方只按序接收，不缓存乱序包，
//! ACK 号为“下一个期望的序号”（即 seq + 1）。

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, trace};

use super::{ACK_PAYLOAD, TransportEndpoint};
use crate::net::{NetApi, Packet};

/// 滑动窗口发送方
#[derive(Debug)]
pub struct WindowSender {
    name: String,
    window_size: usize,
    timeout: f64,
    send_base: i32,
    next_seq: i32,
    in_flight: BTreeMap<i32, Packet>, // seq -> packet
    pending: VecDeque<Vec<u8>>,
}

impl WindowSender {
    pub fn new(name: impl Into<String>, window_size: usize, timeout: f64) -> Self {
        Self {
            name: name.into(),
            window_size,
            timeout,
            send_base: 0,
            next_seq: 0,
            in_flight: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn send_base(&self) -> i32 {
        self.send_base
    }

    pub fn next_seq(&self) -> i32 {
        self.next_seq
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// 在途数据包的序号（升序）
    pub fn in_flight_seqs(&self) -> Vec<i32> {
        self.in_flight.keys().copied().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn has_capacity(&self) -> bool {
        self.in_flight.len() < self.window_size
    }

    fn send_new(&mut self, payload: Vec<u8>, net: &mut dyn NetApi) {
        let seq = self.next_seq;
        // 数据包的 ack 字段取发送前的 next_seq，接收方不使用
        let pkt = Packet::new(seq, seq, payload);
        debug!(sender = %self.name, %pkt, send_base = self.send_base, "发送数据包");
        net.send_to_network(&pkt);
        self.in_flight.insert(seq, pkt);

        // 窗口内第一个在途包负责启动定时器
        if self.send_base == self.next_seq {
            net.start_timer(self.timeout);
        }
        self.next_seq += 1;
    }

    /// 在窗口容量允许的范围内按 FIFO 发送排队数据
    fn drain_pending(&mut self, net: &mut dyn NetApi) {
        while self.has_capacity() {
            let Some(payload) = self.pending.pop_front() else {
                break;
            };
            self.send_new(payload, net);
        }
    }
}

impl TransportEndpoint for WindowSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_application_send(&mut self, payload: Vec<u8>, net: &mut dyn NetApi) {
        self.pending.push_back(payload);
        if !self.has_capacity() {
            debug!(
                sender = %self.name,
                queued = self.pending.len(),
                "窗口已满，数据入队"
            );
            return;
        }
        self.drain_pending(net);
    }

    #[tracing::instrument(skip_all, fields(sender = %self.name, seq = pkt.seq(), ack = pkt.ack()))]
    fn handle_network_receive(&mut self, pkt: Packet, net: &mut dyn NetApi) {
        if pkt.is_corrupt() {
            debug!("ACK 损坏，等待超时恢复");
            return;
        }
        if !self.in_flight.contains_key(&pkt.seq()) {
            debug!("ACK 不对应任何在途数据包，忽略");
            return;
        }

        let ack = pkt.ack();
        if ack <= self.send_base || ack > self.next_seq {
            debug!(send_base = self.send_base, next_seq = self.next_seq, "ACK 超出窗口，忽略");
            return;
        }

        // 累计确认：移除所有 seq < ack 的在途包
        self.in_flight = self.in_flight.split_off(&ack);
        self.send_base = ack;
        trace!(in_flight = ?self.in_flight_seqs(), "窗口前移");

        net.stop_timer();
        if !self.in_flight.is_empty() {
            net.start_timer(self.timeout);
        }

        self.drain_pending(net);
    }

    fn handle_timer_expiry(&mut self, net: &mut dyn NetApi) {
        info!(
            sender = %self.name,
            send_base = self.send_base,
            next_seq = self.next_seq,
            "⏰ 超时，重传整个窗口"
        );
        for pkt in self.in_flight.values() {
            net.resend_to_network(pkt);
        }
        if !self.in_flight.is_empty() {
            net.start_timer(self.timeout);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 滑动窗口接收方
#[derive(Debug)]
pub struct WindowReceiver {
    name: String,
    expected_seq: i32,
    last_ack: Option<Packet>,
    processing: bool,
    backlog: VecDeque<Packet>,
}

impl WindowReceiver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_seq: 0,
            last_ack: None,
            processing: false,
            backlog: VecDeque::new(),
        }
    }

    pub fn expected_seq(&self) -> i32 {
        self.expected_seq
    }

    pub fn last_ack(&self) -> Option<&Packet> {
        self.last_ack.as_ref()
    }

    fn process(&mut self, pkt: Packet, net: &mut dyn NetApi) {
        if !pkt.is_corrupt() && pkt.seq() == self.expected_seq {
            net.deliver_to_application(pkt.payload());
            let ack = Packet::new(pkt.seq(), pkt.seq() + 1, ACK_PAYLOAD);
            debug!(receiver = %self.name, %ack, "按序到达，返回 ACK");
            net.send_to_network(&ack);
            self.expected_seq += 1;
            self.last_ack = Some(ack);
            return;
        }

        match &self.last_ack {
            Some(ack) => {
                debug!(
                    receiver = %self.name,
                    corrupt = pkt.is_corrupt(),
                    seq = pkt.seq(),
                    expected = self.expected_seq,
                    "损坏或乱序，重发最后一个按序 ACK"
                );
                net.resend_to_network(ack);
            }
            None => {
                debug!(receiver = %self.name, seq = pkt.seq(), "损坏或乱序，尚无可重发的 ACK");
            }
        }
    }
}

impl TransportEndpoint for WindowReceiver {
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

    fn handle_network_receive(&mut self, pkt: Packet, net: &mut dyn NetApi) {
        self.backlog.push_back(pkt);
        if self.processing {
            trace!(receiver = %self.name, backlog = self.backlog.len(), "正在处理，数据包入队");
            return;
        }

        self.processing = true;
        while let Some(next) = self.backlog.pop_front() {
            self.process(next, net);
        }
        self.processing = false;
    }

    fn handle_timer_expiry(&mut self, _net: &mut dyn NetApi) {
        debug!(receiver = %self.name, "接收方没有定时器逻辑，忽略");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
