//! 停放与复位策略
//!
//! - 停放：断开连接前（启用时）把执行器移到行程下限
//! - 复位：只有当前位置等于下限时才生效，先把位置改写为名义值
//!   `max / 100`（不发送命令），再移动回下限，使控制器重新走一段已知行程

use crate::error::MotionError;
use crate::position::PositionController;
use crate::state::PositionStatus;
use tic_serial::SerialTransport;
use tracing::{debug, info, warn};

/// 策略所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyPhase {
    #[default]
    Idle,
    Parking,
    Reset,
}

/// 停放结果（停放失败不阻止断开连接）
#[derive(Debug)]
pub enum ParkOutcome {
    /// 未启用停放
    Skipped,
    Parked(PositionStatus),
    Failed(MotionError),
}

impl ParkOutcome {
    pub fn is_parked(&self) -> bool {
        matches!(self, ParkOutcome::Parked(_))
    }
}

/// 复位结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// 已从名义位置移回下限
    Rehomed(PositionStatus),
    /// 当前不在下限，未做任何事
    Ignored { position: u32 },
}

/// 停放策略
#[derive(Debug, Clone, Default)]
pub struct ParkingPolicy {
    enabled: bool,
    phase: PolicyPhase,
}

impl ParkingPolicy {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phase: PolicyPhase::Idle,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn phase(&self) -> PolicyPhase {
        self.phase
    }

    /// 停放到行程下限（尽力而为）
    pub fn park<T>(&mut self, controller: &mut PositionController, link: &mut T) -> ParkOutcome
    where
        T: SerialTransport + ?Sized,
    {
        if !self.enabled {
            return ParkOutcome::Skipped;
        }

        self.phase = PolicyPhase::Parking;
        let home = controller.limits().min();
        info!("Parking focuser at {}", home);

        let outcome = match controller.move_absolute(link, home) {
            Ok(status) => ParkOutcome::Parked(status),
            Err(e) => {
                warn!("Parking failed: {}", e);
                ParkOutcome::Failed(e)
            },
        };

        self.phase = PolicyPhase::Idle;
        outcome
    }

    /// 复位
    pub fn reset<T>(
        &mut self,
        controller: &mut PositionController,
        link: &mut T,
    ) -> Result<ResetOutcome, MotionError>
    where
        T: SerialTransport + ?Sized,
    {
        let limits = controller.limits();
        let position = controller.position();
        if position != limits.min() {
            debug!("Reset ignored at {} (only acts at {})", position, limits.min());
            return Ok(ResetOutcome::Ignored { position });
        }

        self.phase = PolicyPhase::Reset;
        let nominal = limits.nominal_reset_position();
        info!("Resetting: nominal position {} -> {}", nominal, limits.min());
        controller.force_position(nominal);

        let result = controller.move_absolute(link, limits.min());
        self.phase = PolicyPhase::Idle;
        result.map(ResetOutcome::Rehomed)
    }
}
