//! 驱动层错误类型定义
//!
//! `OutOfRange` / `NotConnected` 属于本地拒绝，不产生任何副作用；
//! 传输失败只影响当前请求，由调用方决定是否重试。

use thiserror::Error;
use tic_protocol::{BaudRate, StepMode};
use tic_serial::SerialError;
use tic_tools::SettingsError;

/// 运动请求错误
#[derive(Error, Debug)]
pub enum MotionError {
    /// 目标超出行程（`target` 用 i64 表示以容纳相对移动的下溢）
    #[error("Target {target} outside travel range [{min}, {max}]")]
    OutOfRange { target: i64, min: u32, max: u32 },

    #[error("Focuser not connected")]
    NotConnected,

    /// 写入失败，位置未推进
    #[error("Transport failure: {0}")]
    Transport(#[from] SerialError),

    #[error("Unknown preset slot {0}")]
    UnknownPreset(usize),
}

impl MotionError {
    /// 是否为本地拒绝（而非故障）
    pub fn is_refusal(&self) -> bool {
        !matches!(self, MotionError::Transport(_))
    }
}

/// 细分模式切换错误
#[derive(Error, Debug)]
pub enum ModeError {
    #[error("Focuser not connected")]
    NotConnected,

    /// 写入失败，`active` 为回滚后仍然生效的模式
    #[error("Failed to set step mode, {active} step still active: {source}")]
    TransportFailure {
        active: StepMode,
        #[source]
        source: SerialError,
    },
}

/// 波特率切换错误
#[derive(Error, Debug)]
pub enum BaudError {
    #[error("Focuser not connected")]
    NotConnected,

    #[error("Failed to set baud rate, {active} baud still active: {source}")]
    TransportFailure {
        active: BaudRate,
        #[source]
        source: SerialError,
    },
}

/// 配置值错误（纯本地校验，无设备 I/O）
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Backlash {value} out of range (allowed 0..={max})")]
    BacklashOutOfRange { value: u32, max: u32 },

    #[error("Preset {slot} position {value} outside travel range [{min}, {max}]")]
    PresetOutOfRange {
        slot: usize,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Relative step {value} out of range (allowed 0..={max})")]
    RelativeStepOutOfRange { value: u32, max: u32 },

    #[error("Unknown preset slot {0}")]
    UnknownPreset(usize),

    #[error("Position {value} outside travel range [{min}, {max}]")]
    PositionOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Invalid travel limits: min {min} > max {max}")]
    InvalidLimits { min: u32, max: u32 },

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

/// 驱动层统一错误（用于命令分发）
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    Baud(#[from] BaudError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
