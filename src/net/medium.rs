//! 不可靠网络介质
//!
//! 以一定概率丢弃或损坏数据包，并为幸存的数据包调度到对端的交付事件。
//! 随机数流由构造方注入，整个运行期间只有这一条序列。

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use super::id::EndpointId;
use super::packet::{CORRUPT_SENTINEL, Packet};
use super::stats::{Delivery, Stats};
use crate::sim::{Event, Scheduler, SimTime};
use crate::trace::{CorruptField, TraceEventKind, TraceLogger};

/// 载荷损坏时最多改写的字节数
const MAX_PAYLOAD_HITS: usize = 5;

/// 不可靠网络介质
#[derive(Debug)]
pub struct NetworkMedium {
    loss_prob: f64,
    corrupt_prob: f64,
    rng: StdRng,
    pub stats: Stats,
    pub trace: Option<TraceLogger>,
}

impl NetworkMedium {
    pub fn new(loss_prob: f64, corrupt_prob: f64, rng: StdRng) -> Self {
        Self {
            loss_prob,
            corrupt_prob,
            rng,
            stats: Stats::default(),
            trace: None,
        }
    }

    /// 共享的随机数流（应用层到达间隔也从这里取）
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn record(&mut self, at: SimTime, kind: TraceEventKind) {
        if let Some(t) = self.trace.as_mut() {
            t.push(at.as_f64(), kind);
        }
    }

    /// 把端点发出的数据包交给网络
    #[tracing::instrument(skip(self, pkt, sched), fields(from = %src, seq = pkt.seq(), ack = pkt.ack()))]
    pub fn send_to_network(&mut self, src: EndpointId, pkt: &Packet, sched: &mut Scheduler) {
        let now = sched.now();

        if self.rng.random::<f64>() < self.loss_prob {
            self.stats.lost_pkts += 1;
            info!(%now, %pkt, "📉 丢弃数据包");
            self.record(
                now,
                TraceEventKind::Lost {
                    from: src,
                    seq: pkt.seq(),
                    ack: pkt.ack(),
                },
            );
            return;
        }

        let mut copy = pkt.clone();
        if self.rng.random::<f64>() < self.corrupt_prob {
            let (corrupted, field) = self.corrupt(&copy);
            self.stats.corrupted_pkts += 1;
            match field {
                CorruptField::Payload => self.stats.corrupted_payload += 1,
                CorruptField::Seq => self.stats.corrupted_seq += 1,
                CorruptField::Ack => self.stats.corrupted_ack += 1,
            }
            info!(%now, ?field, original = %pkt, "⚡ 损坏数据包");
            self.record(now, TraceEventKind::Corrupt { from: src, field });
            copy = corrupted;
        }

        // 不早于队列中最晚的非定时器事件，保证链路不乱序
        let last = sched
            .latest_non_timer_time()
            .map_or(now, |t| t.max(now));
        let transit = 1.0 + 2.0 * self.rng.random::<f64>();
        let arrive = last.after(transit);
        let to = src.peer();

        debug!(%now, %last, transit, %arrive, %to, pkt = %copy, "调度数据包到达事件");
        sched.schedule(arrive, Event::delivery(to, copy));
    }

    /// 派生一个恰好有一个字段被改写的副本
    fn corrupt(&mut self, pkt: &Packet) -> (Packet, CorruptField) {
        let x = self.rng.random::<f64>();
        if x < 0.75 && !pkt.payload().is_empty() {
            let mut data = pkt.payload().to_vec();
            let hits = self.rng.random_range(1..=MAX_PAYLOAD_HITS);
            for _ in 0..hits {
                let i = self.rng.random_range(0..data.len());
                data[i] = b'a' + self.rng.random_range(0..26u8);
            }
            trace!(hits, "改写载荷字节");
            (pkt.with_payload(data), CorruptField::Payload)
        } else if x < 0.875 {
            (pkt.with_seq(CORRUPT_SENTINEL), CorruptField::Seq)
        } else {
            (pkt.with_ack(CORRUPT_SENTINEL), CorruptField::Ack)
        }
    }

    /// 应用层数据汇：只做记录，没有协议上的后续影响
    pub fn deliver_to_application(&mut self, endpoint: EndpointId, payload: &[u8], now: SimTime) {
        info!(%now, %endpoint, data = %String::from_utf8_lossy(payload), "✅ 交付给应用层");
        self.stats.endpoint_mut(endpoint).delivered += 1;
        self.stats.deliveries.push(Delivery {
            time: now,
            endpoint,
            payload: payload.to_vec(),
        });
        self.record(
            now,
            TraceEventKind::AppDeliver {
                endpoint,
                data: String::from_utf8_lossy(payload).into_owned(),
            },
        );
    }
}
