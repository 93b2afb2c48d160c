use crate::net::{EndpointId, Packet};
use crate::sim::{Event, EventKind, Scheduler, SimTime};

fn drain_kinds(sched: &mut Scheduler) -> Vec<(f64, EventKind, EndpointId)> {
    let mut out = Vec::new();
    while let Some(item) = sched.pop_earliest() {
        out.push((item.at().as_f64(), item.event().kind, item.event().endpoint));
    }
    out
}

#[test]
fn scheduled_events_order_by_time_then_insertion() {
    let mut sched = Scheduler::default();
    sched.schedule(SimTime(10.0), Event::arrival(EndpointId::Sender));
    sched.schedule(SimTime(5.0), Event::timer(EndpointId::Receiver));
    sched.schedule(SimTime(10.0), Event::timer(EndpointId::Sender));

    let order = drain_kinds(&mut sched);
    assert_eq!(
        order,
        vec![
            (5.0, EventKind::TimerExpiry, EndpointId::Receiver),
            (10.0, EventKind::ApplicationArrival, EndpointId::Sender),
            (10.0, EventKind::TimerExpiry, EndpointId::Sender),
        ]
    );
    assert_eq!(sched.now(), SimTime(10.0));
}

#[test]
fn pop_earliest_advances_clock_and_empty_queue_returns_none() {
    let mut sched = Scheduler::default();
    assert!(sched.pop_earliest().is_none());
    assert_eq!(sched.now(), SimTime::ZERO);

    sched.schedule(SimTime(2.5), Event::arrival(EndpointId::Sender));
    assert_eq!(sched.peek_time(), Some(SimTime(2.5)));
    let item = sched.pop_earliest().expect("event");
    assert_eq!(item.at(), SimTime(2.5));
    assert_eq!(sched.now(), SimTime(2.5));
    assert!(sched.is_empty());
}

#[test]
fn peek_all_lists_in_execution_order_without_removing() {
    let mut sched = Scheduler::default();
    sched.schedule(SimTime(3.0), Event::arrival(EndpointId::Sender));
    sched.schedule(SimTime(1.0), Event::arrival(EndpointId::Receiver));
    sched.schedule(SimTime(2.0), Event::timer(EndpointId::Sender));

    let times: Vec<f64> = sched.peek_all().iter().map(|e| e.at().as_f64()).collect();
    assert_eq!(times, vec![1.0, 2.0, 3.0]);
    assert_eq!(sched.len(), 3);
}

#[test]
fn cancel_matching_removes_only_matching_events() {
    let mut sched = Scheduler::default();
    sched.schedule(SimTime(1.0), Event::timer(EndpointId::Sender));
    sched.schedule(SimTime(2.0), Event::timer(EndpointId::Receiver));
    sched.schedule(
        SimTime(3.0),
        Event::delivery(EndpointId::Sender, Packet::new(0, 1, b"OK".to_vec())),
    );

    let removed = sched.cancel_matching(|e| e.event().kind == EventKind::TimerExpiry);
    assert_eq!(removed, 2);
    assert_eq!(sched.len(), 1);
    assert_eq!(sched.cancel_matching(|_| false), 0);

    let left = sched.pop_earliest().expect("delivery left");
    assert_eq!(left.event().kind, EventKind::NetworkDelivery);
}

#[test]
fn latest_non_timer_time_ignores_timers() {
    let mut sched = Scheduler::default();
    assert_eq!(sched.latest_non_timer_time(), None);

    sched.schedule(SimTime(100.0), Event::timer(EndpointId::Sender));
    assert_eq!(sched.latest_non_timer_time(), None);

    sched.schedule(SimTime(4.0), Event::arrival(EndpointId::Sender));
    sched.schedule(
        SimTime(7.0),
        Event::delivery(EndpointId::Receiver, Packet::new(0, 0, b"x".to_vec())),
    );
    assert_eq!(sched.latest_non_timer_time(), Some(SimTime(7.0)));
}

#[test]
fn scheduled_event_display_mentions_kind_and_packet() {
    let mut sched = Scheduler::default();
    sched.schedule(SimTime(1.0), Event::timer(EndpointId::Sender));
    let s = sched.peek_all()[0].to_string();
    assert!(s.contains("TimerExpiry"), "{s}");
    assert!(s.contains("[no data]"), "{s}");
}
