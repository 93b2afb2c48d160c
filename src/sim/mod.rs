//! 仿真核心模块
//!
//! 此模块包含事件驱动仿真的核心组件，如仿真时间、事件、调度器、定时器服务与仿真器。

// 子模块声明
mod config;
mod event;
mod scheduled_event;
mod scheduler;
mod simulator;
mod time;
mod timer;

// 重新导出公共接口
pub use config::{
    DEFAULT_STOP_WAIT_TIMEOUT, DEFAULT_WINDOW_SIZE, DEFAULT_WINDOW_TIMEOUT, PayloadKind,
    ProtocolSpec, SimConfig,
};
pub use event::{Event, EventKind};
pub use scheduled_event::ScheduledEvent;
pub use scheduler::Scheduler;
pub use simulator::Simulator;
pub use time::SimTime;
