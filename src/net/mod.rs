//! 网络模拟模块
//!
//! 此模块包含不可靠网络的核心组件：端点标识、数据包、网络介质与统计。

// 子模块声明
mod api;
mod id;
mod medium;
mod packet;
mod stats;

// 重新导出公共接口
pub use api::{EndpointCtx, NetApi};
pub use id::EndpointId;
pub use medium::NetworkMedium;
pub use packet::{CORRUPT_SENTINEL, Packet};
pub use stats::{Delivery, EndpointStats, Stats};
