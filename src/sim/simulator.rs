//! 仿真器
//!
//! 持有调度器、网络介质与两个端点：不断取出最早的事件并按类型分派给对应端点。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use super::config::{PayloadKind, SimConfig};
use super::event::{Event, EventKind};
use super::scheduled_event::ScheduledEvent;
use super::scheduler::Scheduler;
use super::time::SimTime;
use crate::error::{ConfigError, SimError};
use crate::net::{EndpointCtx, EndpointId, NetworkMedium, Stats};
use crate::proto::{TransportEndpoint, build_endpoints};
use crate::trace::{TraceEventKind, TraceLogger};

/// 随机载荷长度
const RANDOM_PAYLOAD_LEN: usize = 20;

/// 离散事件仿真器：一对端点 + 不可靠网络。
#[derive(Debug)]
pub struct Simulator {
    cfg: SimConfig,
    sched: Scheduler,
    pub net: NetworkMedium,
    endpoints: [Option<Box<dyn TransportEndpoint>>; 2],
    arrivals_scheduled: u32,
    messages_generated: u32,
    started: bool,
}

impl Simulator {
    /// 使用显式注入的随机数流创建仿真器（端点需另行设置）
    pub fn new(cfg: SimConfig, rng: StdRng) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let net = NetworkMedium::new(cfg.loss_prob, cfg.corrupt_prob, rng);
        Ok(Self {
            cfg,
            sched: Scheduler::default(),
            net,
            endpoints: [None, None],
            arrivals_scheduled: 0,
            messages_generated: 0,
            started: false,
        })
    }

    /// 按配置中的种子创建随机数流
    pub fn from_config(cfg: SimConfig) -> Result<Self, ConfigError> {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(cfg, rng)
    }

    /// 按配置创建仿真器，并装好协议对应的发送方与接收方
    pub fn with_protocol(cfg: SimConfig) -> Result<Self, ConfigError> {
        let (sender, receiver) = build_endpoints(&cfg.protocol);
        let mut sim = Self::from_config(cfg)?;
        sim.set_sender(sender);
        sim.set_receiver(receiver);
        Ok(sim)
    }

    pub fn set_sender(&mut self, ep: Box<dyn TransportEndpoint>) {
        self.endpoints[EndpointId::Sender.index()] = Some(ep);
    }

    pub fn set_receiver(&mut self, ep: Box<dyn TransportEndpoint>) {
        self.endpoints[EndpointId::Receiver.index()] = Some(ep);
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&dyn TransportEndpoint> {
        self.endpoints[id.index()].as_deref()
    }

    /// 以具体类型查看端点状态
    pub fn endpoint_as<T: 'static>(&self, id: EndpointId) -> Option<&T> {
        self.endpoint(id)?.as_any().downcast_ref::<T>()
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    pub fn now(&self) -> SimTime {
        self.sched.now()
    }

    pub fn stats(&self) -> &Stats {
        &self.net.stats
    }

    pub fn enable_trace(&mut self) {
        self.net.trace = Some(TraceLogger::default());
    }

    pub fn take_trace(&mut self) -> Option<TraceLogger> {
        self.net.trace.take()
    }

    /// 直接注入一个事件
    pub fn schedule(&mut self, at: SimTime, ev: Event) {
        self.sched.schedule(at, ev);
    }

    /// 检查角色、初始化两个端点并调度第一个应用层到达
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.started {
            return Ok(());
        }
        for id in EndpointId::ALL {
            if self.endpoints[id.index()].is_none() {
                return Err(SimError::MissingEndpoint(id));
            }
        }
        for id in EndpointId::ALL {
            if let Some(ep) = self.endpoints[id.index()].as_mut() {
                let mut ctx = EndpointCtx::new(id, &mut self.sched, &mut self.net);
                ep.initialize(&mut ctx);
                info!(endpoint = %id, name = ep.name(), "端点已初始化");
            }
        }
        if self.cfg.num_messages > 0 {
            self.schedule_next_arrival();
        }
        self.started = true;
        Ok(())
    }

    /// 处理一个事件；队列为空时返回 `None`
    pub fn step(&mut self) -> Result<Option<EventKind>, SimError> {
        self.start()?;

        if self.cfg.debug_level > 2 {
            for item in self.sched.peek_all() {
                trace!(event = %item, "事件队列");
            }
        }

        let Some(item) = self.sched.pop_earliest() else {
            return Ok(None);
        };
        self.net.stats.events += 1;
        let kind = item.event().kind;
        debug!(
            event_num = self.net.stats.events,
            now = %self.sched.now(),
            seq = item.seq(),
            ?kind,
            endpoint = %item.event().endpoint,
            remaining_queue = self.sched.len(),
            "执行事件"
        );
        self.dispatch(item)?;
        Ok(Some(kind))
    }

    /// 运行所有事件直到队列为空（若配置了 `max_time` 则在该时间停止）。
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<(), SimError> {
        if let Some(until) = self.cfg.max_time {
            return self.run_until(SimTime(until));
        }

        info!("▶️  开始运行仿真");
        while self.step()?.is_some() {}
        self.log_summary();
        Ok(())
    }

    /// 运行直到事件队列为空或下一个事件晚于 `until`。
    pub fn run_until(&mut self, until: SimTime) -> Result<(), SimError> {
        self.start()?;
        info!(%until, "▶️  开始运行仿真");
        while let Some(at) = self.sched.peek_time() {
            if at > until {
                break;
            }
            self.step()?;
        }
        self.log_summary();
        Ok(())
    }

    fn log_summary(&self) {
        let s = &self.net.stats;
        info!(
            total_events = s.events,
            final_time = %self.sched.now(),
            lost = s.lost_pkts,
            corrupted = s.corrupted_pkts,
            delivered = s.deliveries.len(),
            "✅ 仿真完成"
        );
    }

    fn schedule_next_arrival(&mut self) {
        let now = self.sched.now();
        let rng = self.net.rng_mut();
        let gap = self.cfg.lambda * rng.random::<f64>() * 2.0;
        let to = if self.cfg.bidirectional && rng.random::<f64>() > 0.5 {
            EndpointId::Receiver
        } else {
            EndpointId::Sender
        };
        self.arrivals_scheduled += 1;
        trace!(%now, gap, %to, "调度下一个应用层到达");
        self.sched.schedule(now.after(gap), Event::arrival(to));
    }

    fn next_payload(&mut self) -> Vec<u8> {
        self.messages_generated += 1;
        match self.cfg.payload {
            PayloadKind::Random => {
                let rng = self.net.rng_mut();
                (0..RANDOM_PAYLOAD_LEN)
                    .map(|_| b'a' + rng.random_range(0..26u8))
                    .collect()
            }
            PayloadKind::Numbered => format!("MSG-{:04}", self.messages_generated).into_bytes(),
        }
    }

    fn dispatch(&mut self, item: ScheduledEvent) -> Result<(), SimError> {
        let now = item.at();
        let Event {
            kind,
            endpoint,
            packet,
        } = item.into_event();

        // 暂时把端点取出来，避免 &mut self 与 &mut endpoint 的重叠借用。
        let mut ep = self.endpoints[endpoint.index()]
            .take()
            .ok_or(SimError::MissingEndpoint(endpoint))?;

        let result = match (kind, packet) {
            (EventKind::ApplicationArrival, None) => {
                if self.arrivals_scheduled < self.cfg.num_messages {
                    self.schedule_next_arrival();
                }
                let payload = self.next_payload();
                self.net.stats.endpoint_mut(endpoint).app_arrivals += 1;
                self.net
                    .record(now, TraceEventKind::AppArrival { endpoint });
                debug!(%endpoint, data = %String::from_utf8_lossy(&payload), "应用层消息到达");
                let mut ctx = EndpointCtx::new(endpoint, &mut self.sched, &mut self.net);
                ep.handle_application_send(payload, &mut ctx);
                Ok(())
            }
            (EventKind::NetworkDelivery, Some(pkt)) => {
                self.net.record(
                    now,
                    TraceEventKind::Arrive {
                        to: endpoint,
                        seq: pkt.seq(),
                        ack: pkt.ack(),
                        corrupt: pkt.is_corrupt(),
                    },
                );
                debug!(%endpoint, %pkt, "📨 数据包到达");
                let mut ctx = EndpointCtx::new(endpoint, &mut self.sched, &mut self.net);
                ep.handle_network_receive(pkt, &mut ctx);
                Ok(())
            }
            (EventKind::TimerExpiry, None) => {
                self.net
                    .record(now, TraceEventKind::TimerExpiry { endpoint });
                debug!(%endpoint, "⏰ 定时器超时");
                let mut ctx = EndpointCtx::new(endpoint, &mut self.sched, &mut self.net);
                ep.handle_timer_expiry(&mut ctx);
                Ok(())
            }
            (kind, packet) => Err(SimError::InternalInconsistency(format!(
                "{kind:?} event for {endpoint} (carries packet: {})",
                packet.is_some()
            ))),
        };

        self.endpoints[endpoint.index()] = Some(ep);
        result
    }
}
