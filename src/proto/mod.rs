//! 传输层/协议模块
//!
//! 包含停等协议与滑动窗口（累计确认）协议的发送方与接收方实现。

pub mod stop_wait;
pub mod window;

use std::any::Any;
use std::fmt::Debug;

use crate::net::{NetApi, Packet};
use crate::sim::ProtocolSpec;

pub use stop_wait::{StopWaitReceiver, StopWaitSender};
pub use window::{WindowReceiver, WindowSender};

/// 接收方回送的 ACK 载荷
pub const ACK_PAYLOAD: &[u8] = b"OK";

/// 传输层端点：调度器只通过这组能力驱动它，不关心具体角色。
pub trait TransportEndpoint: Debug {
    fn name(&self) -> &str;

    fn initialize(&mut self, _net: &mut dyn NetApi) {}

    /// 应用层有新数据要发送
    fn handle_application_send(&mut self, payload: Vec<u8>, net: &mut dyn NetApi);

    /// 网络交付了一个数据包
    fn handle_network_receive(&mut self, pkt: Packet, net: &mut dyn NetApi);

    /// 本端点的定时器超时
    fn handle_timer_expiry(&mut self, net: &mut dyn NetApi);

    fn as_any(&self) -> &dyn Any;
}

/// 按协议配置构造（发送方，接收方）
pub fn build_endpoints(
    spec: &ProtocolSpec,
) -> (Box<dyn TransportEndpoint>, Box<dyn TransportEndpoint>) {
    let timeout = spec.timeout();
    match *spec {
        ProtocolSpec::StopWait { ack_keepalive, .. } => (
            Box::new(StopWaitSender::new("Sender", timeout)),
            Box::new(StopWaitReceiver::new("Receiver", ack_keepalive)),
        ),
        ProtocolSpec::Window { window_size, .. } => (
            Box::new(WindowSender::new(
                "Sender",
                window_size.unwrap_or(crate::sim::DEFAULT_WINDOW_SIZE),
                timeout,
            )),
            Box::new(WindowReceiver::new("Receiver")),
        ),
    }
}
