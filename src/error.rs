//! 错误类型
//!
//! 致命错误（配置缺失、内部不一致）以 `Err` 返回给调用方；
//! 定时器冲突类错误只用于告警，不影响协议控制流。

use crate::net::EndpointId;
use thiserror::Error;

/// 仿真运行错误
#[derive(Debug, Error)]
pub enum SimError {
    /// 运行前未设置发送方或接收方
    #[error("simulation run without a {0} endpoint")]
    MissingEndpoint(EndpointId),
    /// 调度器遇到无法分派的事件，说明实现有缺陷
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 写出追踪文件失败
    #[error("failed to write trace: {0}")]
    TraceIo(#[from] std::io::Error),
    #[error("failed to serialize trace: {0}")]
    TraceJson(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 定时器服务的非致命错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("attempting to start timer for {0} when one already exists")]
    AlreadyPending(EndpointId),
    #[error("unable to cancel timer for {0} as it doesn't seem to exist")]
    NotPending(EndpointId),
}
