//! Retransmission timer service, layered on the scheduler.
//!
//! At most one timer may be pending per endpoint.

use crate::error::TimerError;
use crate::net::EndpointId;
use tracing::trace;

use super::{Event, Scheduler};

impl Scheduler {
    /// Arm a timer for `endpoint` that fires `delay` units from now.
    pub fn start_timer(&mut self, endpoint: EndpointId, delay: f64) -> Result<(), TimerError> {
        if self.has_timer(endpoint) {
            return Err(TimerError::AlreadyPending(endpoint));
        }
        let at = self.now().after(delay);
        trace!(%endpoint, expires = %at, "start timer");
        self.schedule(at, Event::timer(endpoint));
        Ok(())
    }

    /// Remove every pending timer for `endpoint`.
    pub fn stop_timer(&mut self, endpoint: EndpointId) -> Result<(), TimerError> {
        let removed = self.cancel_matching(|item| item.event().is_timer_for(endpoint));
        if removed == 0 {
            return Err(TimerError::NotPending(endpoint));
        }
        trace!(%endpoint, "stop timer");
        Ok(())
    }

    pub fn pending_timers(&self, endpoint: EndpointId) -> usize {
        self.q
            .iter()
            .filter(|item| item.ev.is_timer_for(endpoint))
            .count()
    }

    pub fn has_timer(&self, endpoint: EndpointId) -> bool {
        self.q.iter().any(|item| item.ev.is_timer_for(endpoint))
    }
}
