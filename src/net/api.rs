//! Network-facing API used by transport endpoints.

use tracing::warn;

use super::{EndpointId, NetworkMedium, Packet};
use crate::error::TimerError;
use crate::sim::{Scheduler, SimTime};
use crate::trace::TraceEventKind;

/// Services the simulator exposes to an endpoint while one of its handlers runs.
///
/// Every call is implicitly on behalf of the endpoint being dispatched.
pub trait NetApi {
    fn now(&self) -> SimTime;
    /// Hand a packet to the unreliable medium.
    fn send_to_network(&mut self, pkt: &Packet);
    /// Same as `send_to_network`, but counted and traced as a retransmission.
    fn resend_to_network(&mut self, pkt: &Packet);
    fn deliver_to_application(&mut self, payload: &[u8]);
    /// Arm the endpoint's timer. A second timer is refused with a warning.
    fn start_timer(&mut self, delay: f64);
    /// Cancel the endpoint's timer. Cancelling nothing only warns.
    fn stop_timer(&mut self);
}

/// `NetApi` scoped to one endpoint for the duration of a handler call.
pub struct EndpointCtx<'a> {
    pub(crate) id: EndpointId,
    pub(crate) sched: &'a mut Scheduler,
    pub(crate) net: &'a mut NetworkMedium,
}

impl<'a> EndpointCtx<'a> {
    pub fn new(id: EndpointId, sched: &'a mut Scheduler, net: &'a mut NetworkMedium) -> Self {
        Self { id, sched, net }
    }

    fn transmit(&mut self, pkt: &Packet, retrans: bool) {
        let now = self.sched.now();
        let stats = self.net.stats.endpoint_mut(self.id);
        stats.packets_sent += 1;
        if retrans {
            stats.retransmissions += 1;
        }
        self.net.record(
            now,
            TraceEventKind::Send {
                from: self.id,
                seq: pkt.seq(),
                ack: pkt.ack(),
                retrans,
            },
        );
        self.net.send_to_network(self.id, pkt, self.sched);
    }

    fn timer_warning(&mut self, err: TimerError) {
        let now = self.sched.now();
        warn!(%now, "{err}");
        let kind = match err {
            TimerError::AlreadyPending(endpoint) => {
                self.net.stats.timer_conflicts += 1;
                TraceEventKind::TimerConflict { endpoint }
            }
            TimerError::NotPending(endpoint) => {
                self.net.stats.timer_absent += 1;
                TraceEventKind::TimerAbsent { endpoint }
            }
        };
        self.net.record(now, kind);
    }
}

impl NetApi for EndpointCtx<'_> {
    fn now(&self) -> SimTime {
        self.sched.now()
    }

    fn send_to_network(&mut self, pkt: &Packet) {
        self.transmit(pkt, false);
    }

    fn resend_to_network(&mut self, pkt: &Packet) {
        self.transmit(pkt, true);
    }

    fn deliver_to_application(&mut self, payload: &[u8]) {
        let now = self.sched.now();
        self.net.deliver_to_application(self.id, payload, now);
    }

    fn start_timer(&mut self, delay: f64) {
        let endpoint = self.id;
        match self.sched.start_timer(endpoint, delay) {
            Ok(()) => {
                let expires = self.sched.now().after(delay).as_f64();
                let now = self.sched.now();
                self.net
                    .record(now, TraceEventKind::TimerStart { endpoint, expires });
            }
            Err(err) => self.timer_warning(err),
        }
    }

    fn stop_timer(&mut self) {
        let endpoint = self.id;
        match self.sched.stop_timer(endpoint) {
            Ok(()) => {
                let now = self.sched.now();
                self.net.record(now, TraceEventKind::TimerStop { endpoint });
            }
            Err(err) => self.timer_warning(err),
        }
    }
}
