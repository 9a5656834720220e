//! 状态类型定义

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use tic_protocol::{MAX_STEPS, ProtocolError, max_backlash, nominal_reset_position};

/// 位置属性的对外状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Idle,
    Ok,
    /// 命令正在写入
    Busy,
    /// 最近一次请求被拒绝或失败
    Alert,
}

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// 相对移动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    /// 向内（位置减小）
    Inward,
    /// 向外（位置增大）
    Outward,
}

impl FocusDirection {
    /// 相对移动的符号
    pub fn sign(self) -> i64 {
        match self {
            FocusDirection::Inward => -1,
            FocusDirection::Outward => 1,
        }
    }
}

impl fmt::Display for FocusDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusDirection::Inward => f.write_str("inward"),
            FocusDirection::Outward => f.write_str("outward"),
        }
    }
}

impl FromStr for FocusDirection {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inward" | "-" => Ok(FocusDirection::Inward),
            "out" | "outward" | "+" => Ok(FocusDirection::Outward),
            other => Err(ProtocolError::ParseError(format!(
                "unknown direction '{other}' (expected in|out)"
            ))),
        }
    }
}

/// 运动请求的成功结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    /// 两条命令均已写出，位置已提交
    Moved { from: u32, to: u32 },
    /// 已在目标位置，没有写入
    AlreadyAtTarget { position: u32 },
}

impl PositionStatus {
    /// 请求完成后的当前位置
    pub fn position(&self) -> u32 {
        match *self {
            PositionStatus::Moved { to, .. } => to,
            PositionStatus::AlreadyAtTarget { position } => position,
        }
    }

    pub fn moved(&self) -> bool {
        matches!(self, PositionStatus::Moved { .. })
    }
}

/// 行程范围 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelLimits {
    min: u32,
    max: u32,
}

impl TravelLimits {
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidLimits { min, max });
        }
        Ok(Self { min, max })
    }

    /// `[0, max]`
    pub fn up_to(max: u32) -> Self {
        Self { min: 0, max }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, position: u32) -> bool {
        (self.min..=self.max).contains(&position)
    }

    /// 回差上限
    pub fn max_backlash(&self) -> u32 {
        max_backlash(self.max)
    }

    /// 复位时使用的名义位置（限制在行程内）
    pub fn nominal_reset_position(&self) -> u32 {
        nominal_reset_position(self.max).clamp(self.min, self.max)
    }
}

impl Default for TravelLimits {
    fn default() -> Self {
        Self::up_to(MAX_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = TravelLimits::default();
        assert_eq!((limits.min(), limits.max()), (0, 10_000));
        assert!(limits.contains(0));
        assert!(limits.contains(10_000));
        assert!(!limits.contains(10_001));
        assert_eq!(limits.max_backlash(), 100);
        assert_eq!(limits.nominal_reset_position(), 100);
    }

    #[test]
    fn test_invalid_limits() {
        assert!(matches!(
            TravelLimits::new(10, 5),
            Err(ConfigError::InvalidLimits { min: 10, max: 5 })
        ));
        assert!(TravelLimits::new(5, 5).is_ok());
    }

    #[test]
    fn test_nominal_reset_clamped_into_range() {
        let limits = TravelLimits::new(500, 10_000).unwrap();
        assert_eq!(limits.nominal_reset_position(), 500);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("in".parse::<FocusDirection>().unwrap(), FocusDirection::Inward);
        assert_eq!("OUTWARD".parse::<FocusDirection>().unwrap(), FocusDirection::Outward);
        assert!("sideways".parse::<FocusDirection>().is_err());
        assert_eq!(FocusDirection::Inward.sign(), -1);
    }

    #[test]
    fn test_position_status() {
        let moved = PositionStatus::Moved { from: 0, to: 9_999 };
        assert_eq!(moved.position(), 9_999);
        assert!(moved.moved());

        let stay = PositionStatus::AlreadyAtTarget { position: 42 };
        assert_eq!(stay.position(), 42);
        assert!(!stay.moved());
    }
}
