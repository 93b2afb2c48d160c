//! 仿真配置
//!
//! 所有字段都有默认值，既可以从 JSON 文件加载，也可以由命令行逐项覆盖。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_STOP_WAIT_TIMEOUT: f64 = 100.0;
pub const DEFAULT_WINDOW_TIMEOUT: f64 = 1000.0;
pub const DEFAULT_WINDOW_SIZE: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 应用层一共产生多少条消息
    pub num_messages: u32,
    /// 丢包概率 [0, 1]
    pub loss_prob: f64,
    /// 损坏概率 [0, 1]
    pub corrupt_prob: f64,
    /// 到达间隔尺度：间隔在 [0, 2 * lambda) 内均匀分布
    pub lambda: f64,
    /// 为 true 时应用消息以约 50% 概率落到任一端点
    pub bidirectional: bool,
    /// 日志详细程度 0..=3
    pub debug_level: u8,
    /// 随机数种子；None 表示使用系统熵
    pub seed: Option<u64>,
    /// 下一个事件超过该时间即停止运行
    pub max_time: Option<f64>,
    pub payload: PayloadKind,
    pub protocol: ProtocolSpec,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_messages: 3,
            loss_prob: 0.0,
            corrupt_prob: 0.5,
            lambda: 10.0,
            bidirectional: false,
            debug_level: 0,
            seed: None,
            max_time: None,
            payload: PayloadKind::default(),
            protocol: ProtocolSpec::default(),
        }
    }
}

/// 应用层消息内容的生成方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// 20 个随机小写字母
    #[default]
    Random,
    /// `MSG-0001`、`MSG-0002`……便于核对交付顺序
    Numbered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtocolSpec {
    StopWait {
        #[serde(default)]
        timeout: Option<f64>,
        /// 接收方周期性重发最后一个 ACK 的间隔；默认 None：接收方从不启动定时器，只在收到数据包时回 ACK
        #[serde(default)]
        ack_keepalive: Option<f64>,
    },
    Window {
        #[serde(default)]
        window_size: Option<usize>,
        #[serde(default)]
        timeout: Option<f64>,
    },
}

impl Default for ProtocolSpec {
    fn default() -> Self {
        ProtocolSpec::StopWait {
            timeout: None,
            ack_keepalive: None,
        }
    }
}

impl ProtocolSpec {
    pub fn timeout(&self) -> f64 {
        match self {
            ProtocolSpec::StopWait { timeout, .. } => {
                timeout.unwrap_or(DEFAULT_STOP_WAIT_TIMEOUT)
            }
            ProtocolSpec::Window { timeout, .. } => timeout.unwrap_or(DEFAULT_WINDOW_TIMEOUT),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_prob(field: &'static str, p: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(field, format!("{p} is not a probability in [0, 1]")));
    }
    Ok(())
}

impl SimConfig {
    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: SimConfig = serde_json::from_str(&raw)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_prob("loss_prob", self.loss_prob)?;
        check_prob("corrupt_prob", self.corrupt_prob)?;
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(invalid("lambda", "must be finite and non-negative"));
        }
        if self.debug_level > 3 {
            return Err(invalid("debug_level", "must be in 0..=3"));
        }
        if let Some(t) = self.max_time {
            if !t.is_finite() || t < 0.0 {
                return Err(invalid("max_time", "must be finite and non-negative"));
            }
        }
        if !(self.protocol.timeout() > 0.0) {
            return Err(invalid("timeout", "must be positive"));
        }
        match self.protocol {
            ProtocolSpec::StopWait {
                ack_keepalive: Some(period),
                ..
            } => {
                if !(period > 0.0) {
                    return Err(invalid("ack_keepalive", "must be positive"));
                }
                // 保活定时器会无限重启，没有停止时间的话队列永远不会清空
                if self.max_time.is_none() {
                    return Err(invalid("ack_keepalive", "requires `max_time` to be set"));
                }
            }
            ProtocolSpec::Window {
                window_size: Some(0),
                ..
            } => return Err(invalid("window_size", "must be at least 1")),
            _ => {}
        }
        Ok(())
    }
}
