//! 细分模式与回差管理

use crate::error::{ConfigError, ModeError};
use tic_protocol::{StepMode, TicCommand};
use tic_serial::SerialTransport;
use tracing::{debug, info, warn};

/// 细分模式与回差
///
/// 回差只做范围校验和保存，不参与运动计算。
#[derive(Debug, Clone)]
pub struct StepModeManager {
    mode: StepMode,
    backlash: u32,
    max_backlash: u32,
}

impl StepModeManager {
    pub fn new(max_backlash: u32) -> Self {
        Self {
            mode: StepMode::default(),
            backlash: 0,
            max_backlash,
        }
    }

    /// 当前生效的细分模式
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn backlash(&self) -> u32 {
        self.backlash
    }

    pub fn max_backlash(&self) -> u32 {
        self.max_backlash
    }

    /// 选择细分模式并写出 `SetStepMode` 命令
    ///
    /// 写入失败时回滚到之前的模式，并在错误中报告仍然生效的模式。
    pub fn set_step_mode<T>(&mut self, link: Option<&mut T>, mode: StepMode) -> Result<(), ModeError>
    where
        T: SerialTransport + ?Sized,
    {
        let link = link.ok_or(ModeError::NotConnected)?;

        let previous = self.mode;
        self.mode = mode;

        if let Err(source) = link.write_frame(&TicCommand::SetStepMode(mode).to_frame()) {
            self.mode = previous;
            warn!("Failed to set {} step, staying at {}: {}", mode, previous, source);
            return Err(ModeError::TransportFailure {
                active: previous,
                source,
            });
        }

        info!("Step mode set to {}", mode);
        Ok(())
    }

    /// 设置回差（0..=max_backlash），无设备 I/O
    pub fn set_backlash(&mut self, steps: u32) -> Result<(), ConfigError> {
        if steps > self.max_backlash {
            return Err(ConfigError::BacklashOutOfRange {
                value: steps,
                max: self.max_backlash,
            });
        }
        self.backlash = steps;
        debug!("Backlash set to {}", steps);
        Ok(())
    }

    /// 恢复已保存的模式（不写设备，下次连接后由调用方下发）
    pub(crate) fn restore_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    /// 更换回差上限，超出新上限的回差被截断
    pub(crate) fn set_max_backlash(&mut self, max_backlash: u32) {
        self.max_backlash = max_backlash;
        self.backlash = self.backlash.min(max_backlash);
    }
}
