//! 仿真时间类型
//!
//! 定义仿真时间及其比较规则。

use std::cmp::Ordering;
use std::fmt;

/// 仿真时间（抽象时间单位，浮点）。
///
/// 使用 `f64::total_cmp` 提供全序，便于放入 `BinaryHeap`。
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// 当前时间之后 `delay` 个时间单位
    pub fn after(self, delay: f64) -> SimTime {
        SimTime(self.0 + delay)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
