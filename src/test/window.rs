use super::support::MockNet;
use crate::net::{CORRUPT_SENTINEL, Packet};
use crate::proto::{ACK_PAYLOAD, TransportEndpoint, WindowReceiver, WindowSender};

fn ack_for(seq: i32) -> Packet {
    Packet::new(seq, seq + 1, ACK_PAYLOAD.to_vec())
}

fn assert_window_invariant(tx: &WindowSender) {
    assert!(tx.send_base() <= tx.next_seq());
    assert!(tx.next_seq() <= tx.send_base() + tx.window_size() as i32);
    assert_eq!(
        tx.in_flight_seqs(),
        (tx.send_base()..tx.next_seq()).collect::<Vec<_>>()
    );
}

fn sent_seqs(net: &mut MockNet) -> Vec<(i32, bool)> {
    net.take_sent()
        .into_iter()
        .map(|(p, retrans)| (p.seq(), retrans))
        .collect()
}

#[test]
fn full_window_queues_third_payload() {
    let mut tx = WindowSender::new("Sender", 2, 1000.0);
    let mut net = MockNet::default();

    for i in 1..=3 {
        tx.handle_application_send(format!("MSG-{i:04}").into_bytes(), &mut net);
        assert_window_invariant(&tx);
    }

    assert_eq!(sent_seqs(&mut net), vec![(0, false), (1, false)]);
    assert_eq!(tx.pending_len(), 1);
    assert_eq!(tx.in_flight_seqs(), vec![0, 1]);
    assert_eq!(net.starts, 1, "only the first in-flight packet arms the timer");
    assert_eq!(net.conflicts, 0);
}

#[test]
fn data_packets_carry_their_own_seq_as_ack() {
    let mut tx = WindowSender::new("Sender", 3, 1000.0);
    let mut net = MockNet::default();
    for i in 0..3 {
        tx.handle_application_send(vec![b'A' + i], &mut net);
    }

    let fields: Vec<(i32, i32)> = net
        .take_sent()
        .iter()
        .map(|(p, _)| (p.seq(), p.ack()))
        .collect();
    assert_eq!(fields, vec![(0, 0), (1, 1), (2, 2)]);
}

#[test]
fn ack_slides_window_and_drains_queue() {
    let mut tx = WindowSender::new("Sender", 2, 1000.0);
    let mut net = MockNet::default();
    for i in 1..=3 {
        tx.handle_application_send(format!("MSG-{i:04}").into_bytes(), &mut net);
    }
    net.take_sent();

    tx.handle_network_receive(ack_for(0), &mut net);

    assert_eq!(tx.send_base(), 1);
    let sent = net.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.seq(), 2);
    assert_eq!(sent[0].0.payload(), b"MSG-0003");
    assert_eq!(tx.in_flight_seqs(), vec![1, 2]);
    assert_eq!(tx.pending_len(), 0);
    assert!(net.timer.is_some());
    assert_eq!(net.conflicts + net.absent, 0);
    assert_window_invariant(&tx);
}

#[test]
fn cumulative_ack_removes_everything_below_it() {
    let mut tx = WindowSender::new("Sender", 4, 1000.0);
    let mut net = MockNet::default();
    for i in 0..4 {
        tx.handle_application_send(vec![b'A' + i], &mut net);
    }

    // ACK for seq 0 lost; ACK for seq 2 acknowledges 0, 1 and 2
    tx.handle_network_receive(ack_for(2), &mut net);

    assert_eq!(tx.send_base(), 3);
    assert_eq!(tx.in_flight_seqs(), vec![3]);
    assert!(tx.in_flight_seqs().iter().all(|s| *s >= 3));
    assert!(net.timer.is_some());
    assert_window_invariant(&tx);
}

#[test]
fn final_ack_leaves_timer_stopped() {
    let mut tx = WindowSender::new("Sender", 2, 1000.0);
    let mut net = MockNet::default();
    tx.handle_application_send(b"MSG-0001".to_vec(), &mut net);
    tx.handle_application_send(b"MSG-0002".to_vec(), &mut net);

    tx.handle_network_receive(ack_for(1), &mut net);

    assert!(tx.in_flight_seqs().is_empty());
    assert_eq!(tx.send_base(), 2);
    assert_eq!(net.timer, None);

    // next send restarts the timer from an empty window
    tx.handle_application_send(b"MSG-0003".to_vec(), &mut net);
    assert!(net.timer.is_some());
    assert_eq!(net.conflicts + net.absent, 0);
}

#[test]
fn corrupt_and_stale_acks_are_ignored() {
    let mut tx = WindowSender::new("Sender", 2, 1000.0);
    let mut net = MockNet::default();
    tx.handle_application_send(b"MSG-0001".to_vec(), &mut net);
    tx.handle_application_send(b"MSG-0002".to_vec(), &mut net);
    net.take_sent();
    let timer = net.timer;

    tx.handle_network_receive(ack_for(0).with_ack(CORRUPT_SENTINEL), &mut net);
    tx.handle_network_receive(ack_for(1).with_payload(b"Oa".to_vec()), &mut net);
    tx.handle_network_receive(ack_for(7), &mut net);

    assert_eq!(tx.send_base(), 0);
    assert_eq!(tx.in_flight_seqs(), vec![0, 1]);
    assert!(net.sent.is_empty());
    assert_eq!(net.timer, timer);
    assert_eq!(net.stops, 0);
}

#[test]
fn duplicate_ack_after_slide_is_ignored() {
    let mut tx = WindowSender::new("Sender", 2, 1000.0);
    let mut net = MockNet::default();
    tx.handle_application_send(b"MSG-0001".to_vec(), &mut net);
    tx.handle_application_send(b"MSG-0002".to_vec(), &mut net);
    tx.handle_network_receive(ack_for(0), &mut net);
    let stops = net.stops;

    tx.handle_network_receive(ack_for(0), &mut net);

    assert_eq!(tx.send_base(), 1);
    assert_eq!(net.stops, stops);
}

#[test]
fn timeout_retransmits_whole_window() {
    let mut tx = WindowSender::new("Sender", 3, 1000.0);
    let mut net = MockNet::default();
    for i in 0..3 {
        tx.handle_application_send(vec![b'A' + i], &mut net);
    }
    net.take_sent();

    net.now = 1000.0;
    net.fire_timer();
    tx.handle_timer_expiry(&mut net);

    assert_eq!(sent_seqs(&mut net), vec![(0, true), (1, true), (2, true)]);
    assert_eq!(net.timer, Some(2000.0));
    assert_eq!(tx.send_base(), 0);
}

#[test]
fn receiver_acks_in_order_packets_with_next_expected() {
    let mut rx = WindowReceiver::new("Receiver");
    let mut net = MockNet::default();

    for seq in 0..3 {
        rx.handle_network_receive(Packet::new(seq, seq, format!("MSG-{seq}").into_bytes()), &mut net);
    }

    assert_eq!(net.delivered.len(), 3);
    let acks: Vec<(i32, i32)> = net.sent.iter().map(|(p, _)| (p.seq(), p.ack())).collect();
    assert_eq!(acks, vec![(0, 1), (1, 2), (2, 3)]);
    assert_eq!(rx.expected_seq(), 3);
}

#[test]
fn receiver_repeats_last_ack_for_out_of_order_or_corrupt() {
    let mut rx = WindowReceiver::new("Receiver");
    let mut net = MockNet::default();
    rx.handle_network_receive(Packet::new(0, 1, b"MSG-0".to_vec()), &mut net);
    let (last, _) = net.take_sent().remove(0);

    // seq 1 lost; seq 2 arrives early and is not buffered
    rx.handle_network_receive(Packet::new(2, 3, b"MSG-2".to_vec()), &mut net);
    rx.handle_network_receive(
        Packet::new(1, 2, b"MSG-1".to_vec()).with_seq(CORRUPT_SENTINEL),
        &mut net,
    );

    assert_eq!(net.delivered, vec![b"MSG-0".to_vec()]);
    assert_eq!(net.take_sent(), vec![(last.clone(), true), (last, true)]);
    assert_eq!(rx.expected_seq(), 1);

    // retransmitted seq 1 then seq 2 are accepted in order
    rx.handle_network_receive(Packet::new(1, 2, b"MSG-1".to_vec()), &mut net);
    rx.handle_network_receive(Packet::new(2, 3, b"MSG-2".to_vec()), &mut net);
    assert_eq!(net.delivered.len(), 3);
    assert_eq!(rx.expected_seq(), 3);
}

#[test]
fn receiver_without_history_stays_silent() {
    let mut rx = WindowReceiver::new("Receiver");
    let mut net = MockNet::default();

    rx.handle_network_receive(Packet::new(1, 2, b"early".to_vec()), &mut net);
    rx.handle_network_receive(
        Packet::new(0, 1, b"first".to_vec()).with_ack(CORRUPT_SENTINEL),
        &mut net,
    );

    assert!(net.sent.is_empty());
    assert!(net.delivered.is_empty());
    assert!(rx.last_ack().is_none());
}
