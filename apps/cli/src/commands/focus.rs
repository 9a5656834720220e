//! 调焦器操作命令
//!
//! 命令行参数在这里一次性转换为 `FocuserCommand`。

use clap::{Subcommand, ValueEnum};
use std::time::Duration;
use tic_sdk::prelude::{FocusDirection, FocuserCommand, StepMode};

/// 开关值
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(value: Switch) -> Self {
        value == Switch::On
    }
}

/// 预设位操作
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PresetAction {
    /// 保存预设位
    Set {
        /// 槽位（0..=2）
        slot: usize,
        /// 位置（步）
        position: u32,
    },

    /// 移动到预设位
    Goto {
        /// 槽位（0..=2）
        slot: usize,
    },
}

/// 调焦器命令
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FocusCommand {
    /// 移动到绝对位置
    Move {
        /// 目标位置（步）
        position: u32,
    },

    /// 向内移动
    In {
        /// 步数（默认使用配置中的相对步数）
        ticks: Option<u32>,

        /// 定时移动（毫秒），与步数互斥
        #[arg(long, conflicts_with = "ticks")]
        ms: Option<u64>,
    },

    /// 向外移动
    Out {
        /// 步数（默认使用配置中的相对步数）
        ticks: Option<u32>,

        /// 定时移动（毫秒），与步数互斥
        #[arg(long, conflicts_with = "ticks")]
        ms: Option<u64>,
    },

    /// 设置细分模式（quarter, half, full）
    Mode { mode: StepMode },

    /// 设置串口波特率（索引 0..=4）
    Baud { index: usize },

    /// 设置回差（步）
    Backlash { steps: u32 },

    /// 设置默认相对步数
    Step { ticks: u32 },

    /// 预设位
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// 断开前停放到最小位置
    Park {
        #[arg(value_enum)]
        state: Switch,
    },

    /// 复位（只在位于最小位置时生效）
    Reset,

    /// 同步位置计数（不移动）
    Sync { position: u32 },
}

impl FocusCommand {
    pub fn into_command(self) -> FocuserCommand {
        match self {
            FocusCommand::Move { position } => FocuserCommand::MoveAbsolute(position),
            FocusCommand::In { ticks, ms } => relative(FocusDirection::Inward, ticks, ms),
            FocusCommand::Out { ticks, ms } => relative(FocusDirection::Outward, ticks, ms),
            FocusCommand::Mode { mode } => FocuserCommand::SetStepMode(mode),
            FocusCommand::Baud { index } => FocuserCommand::SetBaudRate(index),
            FocusCommand::Backlash { steps } => FocuserCommand::SetBacklash(steps),
            FocusCommand::Step { ticks } => FocuserCommand::SetRelativeStep(ticks),
            FocusCommand::Preset {
                action: PresetAction::Set { slot, position },
            } => FocuserCommand::SetPreset { slot, position },
            FocusCommand::Preset {
                action: PresetAction::Goto { slot },
            } => FocuserCommand::GotoPreset(slot),
            FocusCommand::Park { state } => FocuserCommand::SetParking(state.into()),
            FocusCommand::Reset => FocuserCommand::Reset,
            FocusCommand::Sync { position } => FocuserCommand::Sync(position),
        }
    }
}

fn relative(direction: FocusDirection, ticks: Option<u32>, ms: Option<u64>) -> FocuserCommand {
    match (ticks, ms) {
        (Some(ticks), _) => FocuserCommand::MoveRelative(direction, ticks),
        (None, Some(ms)) => FocuserCommand::MoveTimed(direction, Duration::from_millis(ms)),
        (None, None) => FocuserCommand::Nudge(direction),
    }
}
