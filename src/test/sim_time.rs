use crate::sim::SimTime;

#[test]
fn sim_time_after_adds_delay() {
    assert_eq!(SimTime::ZERO.after(2.5), SimTime(2.5));
    assert_eq!(SimTime(10.0).after(0.0), SimTime(10.0));
}

#[test]
fn sim_time_orders_totally() {
    let mut times = vec![SimTime(3.0), SimTime(1.5), SimTime(2.25), SimTime::ZERO];
    times.sort();
    assert_eq!(
        times,
        vec![SimTime::ZERO, SimTime(1.5), SimTime(2.25), SimTime(3.0)]
    );
    assert_eq!(SimTime(1.0).max(SimTime(4.0)), SimTime(4.0));
}

#[test]
fn sim_time_displays_two_decimals() {
    assert_eq!(SimTime(3.14159).to_string(), "3.14");
}
