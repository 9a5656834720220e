//! 命令分发
//!
//! 宿主框架传入的请求在边界处解析为 `FocuserCommand`，
//! 再由 `TicFocuser::execute` 分发到对应操作。

use crate::error::DriverError;
use crate::focuser::{Focuser, TicFocuser};
use crate::parking::ResetOutcome;
use crate::state::{FocusDirection, PositionStatus};
use std::time::Duration;
use tic_protocol::{BaudRate, StepMode};
use tic_serial::SerialTransport;

/// 调焦器命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocuserCommand {
    /// 绝对移动
    MoveAbsolute(u32),
    /// 相对移动
    MoveRelative(FocusDirection, u32),
    /// 按默认相对步数移动
    Nudge(FocusDirection),
    /// 定时移动
    MoveTimed(FocusDirection, Duration),
    GotoPreset(usize),
    SetPreset { slot: usize, position: u32 },
    SetStepMode(StepMode),
    /// 波特率索引（越界回落到 115200）
    SetBaudRate(usize),
    SetBacklash(u32),
    SetParking(bool),
    SetRelativeStep(u32),
    Reset,
    Sync(u32),
}

impl FocuserCommand {
    /// 是否需要串口
    pub fn requires_connection(&self) -> bool {
        !matches!(
            self,
            FocuserCommand::SetPreset { .. }
                | FocuserCommand::SetBacklash(_)
                | FocuserCommand::SetParking(_)
                | FocuserCommand::SetRelativeStep(_)
                | FocuserCommand::Sync(_)
        )
    }

    /// 是否会驱动电机（结果依赖已知的当前位置）
    pub fn moves_focuser(&self) -> bool {
        matches!(
            self,
            FocuserCommand::MoveAbsolute(_)
                | FocuserCommand::MoveRelative(..)
                | FocuserCommand::Nudge(_)
                | FocuserCommand::MoveTimed(..)
                | FocuserCommand::GotoPreset(_)
                | FocuserCommand::Reset
        )
    }
}

/// 命令执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Motion(PositionStatus),
    Reset(ResetOutcome),
    StepMode(StepMode),
    BaudRate(BaudRate),
    /// 本地配置已更新
    Updated,
}

impl<T: SerialTransport> TicFocuser<T> {
    /// 执行一条命令
    pub fn execute(&mut self, command: FocuserCommand) -> Result<CommandOutcome, DriverError> {
        let outcome = match command {
            FocuserCommand::MoveAbsolute(target) => {
                CommandOutcome::Motion(self.move_absolute(target)?)
            },
            FocuserCommand::MoveRelative(direction, ticks) => {
                CommandOutcome::Motion(self.move_relative(direction, ticks)?)
            },
            FocuserCommand::Nudge(direction) => CommandOutcome::Motion(self.nudge(direction)?),
            FocuserCommand::MoveTimed(direction, duration) => {
                CommandOutcome::Motion(self.move_timed(direction, duration)?)
            },
            FocuserCommand::GotoPreset(slot) => CommandOutcome::Motion(self.goto_preset(slot)?),
            FocuserCommand::SetPreset { slot, position } => {
                self.set_preset(slot, position)?;
                CommandOutcome::Updated
            },
            FocuserCommand::SetStepMode(mode) => {
                self.set_step_mode(mode)?;
                CommandOutcome::StepMode(mode)
            },
            FocuserCommand::SetBaudRate(index) => CommandOutcome::BaudRate(self.set_baud_rate(index)?),
            FocuserCommand::SetBacklash(steps) => {
                self.set_backlash(steps)?;
                CommandOutcome::Updated
            },
            FocuserCommand::SetParking(enabled) => {
                self.set_parking(enabled);
                CommandOutcome::Updated
            },
            FocuserCommand::SetRelativeStep(ticks) => {
                self.set_relative_step(ticks)?;
                CommandOutcome::Updated
            },
            FocuserCommand::Reset => CommandOutcome::Reset(self.reset()?),
            FocuserCommand::Sync(position) => {
                self.sync(position)?;
                CommandOutcome::Updated
            },
        };
        Ok(outcome)
    }
}
