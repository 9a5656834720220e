//! 位置控制器
//!
//! 维护当前步数位置，把绝对/相对/定时移动请求转换为
//! "退出安全启动 + 设置目标位置" 两条命令。
//!
//! 只有两条命令都写出成功时位置才会提交；
//! 任何一条失败都保持原位置并把状态置为 `Alert`。

use crate::error::{ConfigError, MotionError};
use crate::state::{FocusDirection, MotionState, PositionStatus, TravelLimits};
use std::time::Duration;
use tic_protocol::{STEP_DELAY_MS, TicCommand};
use tic_serial::SerialTransport;
use tracing::{debug, trace, warn};

/// 位置控制器
#[derive(Debug, Clone)]
pub struct PositionController {
    position: u32,
    limits: TravelLimits,
    state: MotionState,
}

impl PositionController {
    /// 从行程下限开始
    pub fn new(limits: TravelLimits) -> Self {
        Self {
            position: limits.min(),
            limits,
            state: MotionState::Idle,
        }
    }

    /// 从已知位置开始（例如停放后保存的位置）
    pub fn with_position(limits: TravelLimits, position: u32) -> Result<Self, ConfigError> {
        let mut controller = Self::new(limits);
        controller.sync(position)?;
        Ok(controller)
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn limits(&self) -> TravelLimits {
        self.limits
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// 移动到绝对位置
    ///
    /// - 目标超出行程：`OutOfRange`，不写入，状态不变
    /// - 已在目标：`AlreadyAtTarget`，不写入
    /// - 否则依次写出安全启动和目标位置，全部成功才更新位置
    pub fn move_absolute<T>(
        &mut self,
        link: &mut T,
        target: u32,
    ) -> Result<PositionStatus, MotionError>
    where
        T: SerialTransport + ?Sized,
    {
        if !self.limits.contains(target) {
            debug!(
                "Rejecting target {} outside [{}, {}]",
                target,
                self.limits.min(),
                self.limits.max()
            );
            return Err(self.out_of_range(i64::from(target)));
        }

        if target == self.position {
            trace!("Already at {}", target);
            return Ok(PositionStatus::AlreadyAtTarget { position: target });
        }

        self.state = MotionState::Busy;
        debug!("Moving {} -> {}", self.position, target);

        let sent = link
            .write_frame(&TicCommand::ExitSafeStart.to_frame())
            .and_then(|()| link.write_frame(&TicCommand::SetTargetPosition(target).to_frame()));

        if let Err(e) = sent {
            self.state = MotionState::Alert;
            warn!("Move to {} failed, holding at {}: {}", target, self.position, e);
            return Err(MotionError::Transport(e));
        }

        let from = self.position;
        self.position = target;
        self.state = MotionState::Ok;
        Ok(PositionStatus::Moved { from, to: target })
    }

    /// 相对移动
    ///
    /// 在 i64 上计算目标，向内越过 0 同样按 `OutOfRange` 拒绝。
    pub fn move_relative<T>(
        &mut self,
        link: &mut T,
        direction: FocusDirection,
        ticks: u32,
    ) -> Result<PositionStatus, MotionError>
    where
        T: SerialTransport + ?Sized,
    {
        let target = i64::from(self.position) + direction.sign() * i64::from(ticks);
        let target = u32::try_from(target).map_err(|_| self.out_of_range(target))?;
        self.move_absolute(link, target)
    }

    /// 定时移动：每 `STEP_DELAY_MS` 毫秒一步，换算成相对移动
    pub fn move_timed<T>(
        &mut self,
        link: &mut T,
        direction: FocusDirection,
        duration: Duration,
    ) -> Result<PositionStatus, MotionError>
    where
        T: SerialTransport + ?Sized,
    {
        let ticks = timed_ticks(duration);
        debug!("Timed move {} for {:?} = {} ticks", direction, duration, ticks);
        self.move_relative(link, direction, ticks)
    }

    /// 同步：把当前位置改写为给定值，不发送命令
    pub fn sync(&mut self, position: u32) -> Result<(), ConfigError> {
        if !self.limits.contains(position) {
            return Err(ConfigError::PositionOutOfRange {
                value: position,
                min: self.limits.min(),
                max: self.limits.max(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// 更换行程范围，当前位置必须仍在新范围内
    pub fn set_limits(&mut self, limits: TravelLimits) -> Result<(), ConfigError> {
        if !limits.contains(self.position) {
            return Err(ConfigError::PositionOutOfRange {
                value: self.position,
                min: limits.min(),
                max: limits.max(),
            });
        }
        self.limits = limits;
        Ok(())
    }

    /// 强制改写位置（复位流程使用，值已由 `TravelLimits` 限制在范围内）
    pub(crate) fn force_position(&mut self, position: u32) {
        self.position = position.clamp(self.limits.min(), self.limits.max());
    }

    fn out_of_range(&self, target: i64) -> MotionError {
        MotionError::OutOfRange {
            target,
            min: self.limits.min(),
            max: self.limits.max(),
        }
    }
}

/// 定时移动换算的步数（饱和到 u32）
pub fn timed_ticks(duration: Duration) -> u32 {
    let ticks = duration.as_millis() / u128::from(STEP_DELAY_MS);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}
