//! 控制帧构建
//!
//! 纯函数：把语义命令翻译成 Tic 的线上字节，无副作用。
//! 数值范围检查由调用方（位置控制器）负责，编码器本身不做限制。

use crate::ids::*;
use crate::{ProtocolError, TicFrame};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// 细分模式
// ============================================================================

/// 步进细分模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum StepMode {
    /// 1/4 步
    Quarter = 0x03,
    /// 1/2 步（默认）
    #[default]
    Half = 0x02,
    /// 整步
    Full = 0x01,
}

impl StepMode {
    /// 所有模式，按界面顺序排列
    pub const ALL: [StepMode; 3] = [StepMode::Quarter, StepMode::Half, StepMode::Full];

    /// 线上编码值
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 每整步的微步数
    pub fn microsteps(self) -> u32 {
        match self {
            StepMode::Quarter => 4,
            StepMode::Half => 2,
            StepMode::Full => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StepMode::Quarter => "quarter",
            StepMode::Half => "half",
            StepMode::Full => "full",
        }
    }
}

impl TryFrom<u8> for StepMode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x03 => Ok(StepMode::Quarter),
            0x02 => Ok(StepMode::Half),
            0x01 => Ok(StepMode::Full),
            _ => Err(ProtocolError::InvalidValue {
                field: "StepMode".to_string(),
                value,
            }),
        }
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarter" | "1/4" | "4" => Ok(StepMode::Quarter),
            "half" | "1/2" | "2" => Ok(StepMode::Half),
            "full" | "1" => Ok(StepMode::Full),
            other => Err(ProtocolError::ParseError(format!(
                "unknown step mode '{other}' (expected quarter|half|full)"
            ))),
        }
    }
}

// ============================================================================
// 编码函数
// ============================================================================

/// Exit safe start
///
/// 上电、故障或显式停止后，固件要求先清除 safe-start 才接受运动命令。
/// 已处于非 safe-start 状态时重复发送无副作用。
pub fn encode_exit_safe_start() -> [u8; 1] {
    [CMD_EXIT_SAFE_START]
}

/// Set target position
///
/// - Byte 0: `0xE0`
/// - Byte 1: 四个负载字节各自的第 7 位（bit0 ← value bit7，bit1 ← bit15，
///   bit2 ← bit23，bit3 ← bit31）
/// - Byte 2-5: `value` 每个字节的低 7 位（小端顺序）
pub fn encode_set_target_position(value: u32) -> [u8; 6] {
    [
        CMD_SET_TARGET_POSITION,
        (((value >> 7) & 1) | ((value >> 14) & 2) | ((value >> 21) & 4) | ((value >> 28) & 8))
            as u8,
        (value & 0x7F) as u8,
        ((value >> 8) & 0x7F) as u8,
        ((value >> 16) & 0x7F) as u8,
        ((value >> 24) & 0x7F) as u8,
    ]
}

/// 解码 set-target-position 帧（编码的逆运算，用于诊断和测试）
pub fn decode_set_target_position(frame: &[u8]) -> Result<u32, ProtocolError> {
    if frame.len() != 6 {
        return Err(ProtocolError::InvalidLength {
            expected: 6,
            actual: frame.len(),
        });
    }
    if frame[0] != CMD_SET_TARGET_POSITION {
        return Err(ProtocolError::UnexpectedCommand {
            expected: CMD_SET_TARGET_POSITION,
            actual: frame[0],
        });
    }
    if let Some((index, &value)) = frame.iter().enumerate().skip(1).find(|(_, b)| **b & 0x80 != 0) {
        return Err(ProtocolError::FramingBitSet { index, value });
    }

    let high_bits = frame[1];
    let value = (0..4).fold(0u32, |acc, i| {
        let low = frame[2 + i] as u32;
        let high = ((high_bits >> i) & 1) as u32;
        acc | ((low | (high << 7)) << (8 * i))
    });
    Ok(value)
}

/// Set step mode
pub fn encode_set_step_mode(mode: StepMode) -> [u8; 2] {
    [CMD_SET_STEP_MODE, mode.as_u8()]
}

// ============================================================================
// 语义命令
// ============================================================================

/// 发往控制器的语义命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicCommand {
    ExitSafeStart,
    SetTargetPosition(u32),
    SetStepMode(StepMode),
}

impl TicCommand {
    /// 转换为命令帧
    pub fn to_frame(self) -> TicFrame {
        match self {
            TicCommand::ExitSafeStart => TicFrame::new(&encode_exit_safe_start()),
            TicCommand::SetTargetPosition(value) => {
                TicFrame::new(&encode_set_target_position(value))
            },
            TicCommand::SetStepMode(mode) => TicFrame::new(&encode_set_step_mode(mode)),
        }
    }

    /// 从命令帧解析（只识别本驱动会发送的命令）
    pub fn from_frame(frame: &TicFrame) -> Result<Self, ProtocolError> {
        let bytes = frame.as_bytes();
        match frame.command() {
            Some(CMD_EXIT_SAFE_START) if bytes.len() == 1 => Ok(TicCommand::ExitSafeStart),
            Some(CMD_SET_TARGET_POSITION) => {
                decode_set_target_position(bytes).map(TicCommand::SetTargetPosition)
            },
            Some(CMD_SET_STEP_MODE) if bytes.len() == 2 => {
                StepMode::try_from(bytes[1]).map(TicCommand::SetStepMode)
            },
            Some(actual) => Err(ProtocolError::ParseError(format!(
                "unrecognized frame {frame} (command 0x{actual:02X})"
            ))),
            None => Err(ProtocolError::InvalidLength {
                expected: 1,
                actual: 0,
            }),
        }
    }
}
