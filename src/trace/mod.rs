//! 仿真事件追踪（用于离线回放 / 结果核对）
//!
//! 与控制台日志不同，这里记录结构化的 JSON 事件：
//! - **结构化**：按事件类型区分，字段固定
//! - **可核对**：测试和外部脚本可以直接检查发送/确认/超时顺序

mod types;

pub use types::{CorruptField, TraceEvent, TraceEventKind, TraceLogger};
