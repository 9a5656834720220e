//! 调焦器会话
//!
//! `TicFocuser` 在一个连接周期内独占持有串口，组合位置控制、
//! 细分模式、停放策略和预设位，并把结果推送给 `StatusSink`。

use crate::builder::TicFocuserBuilder;
use crate::error::{BaudError, ConfigError, ModeError, MotionError};
use crate::parking::{ParkOutcome, ParkingPolicy, PolicyPhase, ResetOutcome};
use crate::position::PositionController;
use crate::sink::{MessageLevel, StatusSink, TracingSink};
use crate::state::{ConnectionState, FocusDirection, MotionState, PositionStatus, TravelLimits};
use crate::stepping::StepModeManager;
use std::time::Duration;
use tic_protocol::{
    BaudRate, DEFAULT_DEVICE_NAME, DRIVER_VERSION, PRESET_COUNT, StepMode, encode_set_baud_rate,
};
use tic_serial::SerialTransport;
use tic_tools::FocuserSettings;
use tracing::{debug, info, warn};

/// 宿主框架看到的调焦器能力
///
/// 宿主只通过这些操作驱动设备；连接管理和配置属于具体会话。
pub trait Focuser {
    /// 移动到绝对位置
    fn move_absolute(&mut self, target: u32) -> Result<PositionStatus, MotionError>;

    /// 按方向移动若干步
    fn move_relative(
        &mut self,
        direction: FocusDirection,
        ticks: u32,
    ) -> Result<PositionStatus, MotionError>;

    /// 选择细分模式
    fn set_step_mode(&mut self, mode: StepMode) -> Result<(), ModeError>;

    /// 按索引设置串口波特率
    fn set_baud_rate(&mut self, index: usize) -> Result<BaudRate, BaudError>;
}

/// Tic 调焦器会话
pub struct TicFocuser<T: SerialTransport> {
    name: String,
    link: Option<T>,
    controller: PositionController,
    stepping: StepModeManager,
    parking: ParkingPolicy,
    presets: [u32; PRESET_COUNT],
    relative_step: u32,
    baud: BaudRate,
    sink: Box<dyn StatusSink>,
}

impl<T: SerialTransport> TicFocuser<T> {
    /// 使用默认行程和日志接收器创建（未连接）
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_DEVICE_NAME.to_string(),
            TravelLimits::default(),
            Box::new(TracingSink::default()),
        )
    }

    pub fn builder() -> TicFocuserBuilder {
        TicFocuserBuilder::new()
    }

    pub(crate) fn from_parts(name: String, limits: TravelLimits, sink: Box<dyn StatusSink>) -> Self {
        Self {
            name,
            link: None,
            controller: PositionController::new(limits),
            stepping: StepModeManager::new(limits.max_backlash()),
            parking: ParkingPolicy::default(),
            presets: [limits.min(); PRESET_COUNT],
            relative_step: (limits.max() / 100).max(1),
            baud: BaudRate::default(),
            sink,
        }
    }

    // ========================================================================
    // 连接管理
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 驱动版本 (major, minor)
    pub fn version(&self) -> (u16, u16) {
        DRIVER_VERSION
    }

    pub fn connection_state(&self) -> ConnectionState {
        if self.link.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// 握手
    ///
    /// 协议没有应答帧，只要持有串口即视为成功。
    pub fn handshake(&self) -> Result<(), MotionError> {
        if self.link.is_none() {
            return Err(MotionError::NotConnected);
        }
        Ok(())
    }

    /// 接管一个已打开的串口
    ///
    /// 已连接时旧串口被释放并替换。
    pub fn connect(&mut self, link: T) {
        if self.link.replace(link).is_some() {
            warn!("{}: replacing existing connection", self.name);
        }

        let (major, minor) = DRIVER_VERSION;
        info!("{} v{}.{} connected", self.name, major, minor);
        self.sink
            .message(MessageLevel::Info, &format!("{} connected", self.name));
        self.sink
            .position_changed(self.controller.position(), MotionState::Ok);
        self.sink
            .step_mode_changed(self.stepping.mode(), MotionState::Ok);
    }

    /// 断开连接
    ///
    /// 启用停放时先移动到下限；停放失败只记录警告，串口总会被释放。
    pub fn disconnect(&mut self) -> Result<ParkOutcome, MotionError> {
        let mut link = self.link.take().ok_or(MotionError::NotConnected)?;

        let outcome = self.parking.park(&mut self.controller, &mut link);
        match &outcome {
            ParkOutcome::Parked(status) => {
                self.sink
                    .position_changed(status.position(), MotionState::Ok);
            },
            ParkOutcome::Failed(e) => {
                self.sink.position_changed(self.controller.position(), MotionState::Alert);
                self.sink
                    .message(MessageLevel::Warning, &format!("Parking failed: {e}"));
            },
            ParkOutcome::Skipped => {},
        }

        drop(link);
        self.on_released();
        Ok(outcome)
    }

    /// 释放串口但不停放（位置保持在当前值）
    pub fn release(&mut self) -> Result<(), MotionError> {
        let link = self.link.take().ok_or(MotionError::NotConnected)?;
        drop(link);
        debug!("{}: released at {}", self.name, self.controller.position());
        self.on_released();
        Ok(())
    }

    fn on_released(&mut self) {
        self.sink.properties_removed();
        self.sink.message(
            MessageLevel::Info,
            &format!("{} disconnected successfully", self.name),
        );
        info!("{} disconnected", self.name);
    }

    // ========================================================================
    // 状态查询
    // ========================================================================

    pub fn position(&self) -> u32 {
        self.controller.position()
    }

    pub fn motion_state(&self) -> MotionState {
        self.controller.state()
    }

    pub fn limits(&self) -> TravelLimits {
        self.controller.limits()
    }

    pub fn step_mode(&self) -> StepMode {
        self.stepping.mode()
    }

    pub fn backlash(&self) -> u32 {
        self.stepping.backlash()
    }

    pub fn baud_rate(&self) -> BaudRate {
        self.baud
    }

    pub fn parking_enabled(&self) -> bool {
        self.parking.enabled()
    }

    pub fn policy_phase(&self) -> PolicyPhase {
        self.parking.phase()
    }

    pub fn presets(&self) -> [u32; PRESET_COUNT] {
        self.presets
    }

    pub fn relative_step(&self) -> u32 {
        self.relative_step
    }

    // ========================================================================
    // 运动
    // ========================================================================

    /// 按默认相对步数移动一次
    pub fn nudge(&mut self, direction: FocusDirection) -> Result<PositionStatus, MotionError> {
        let ticks = self.relative_step;
        self.move_relative(direction, ticks)
    }

    /// 定时移动
    pub fn move_timed(
        &mut self,
        direction: FocusDirection,
        duration: Duration,
    ) -> Result<PositionStatus, MotionError> {
        let link = self.link.as_mut().ok_or(MotionError::NotConnected)?;
        let result = self.controller.move_timed(link, direction, duration);
        self.report_motion(&result);
        result
    }

    /// 移动到预设位
    pub fn goto_preset(&mut self, slot: usize) -> Result<PositionStatus, MotionError> {
        let target = *self.presets.get(slot).ok_or(MotionError::UnknownPreset(slot))?;
        debug!("Going to preset {} at {}", slot, target);
        self.move_absolute(target)
    }

    /// 复位（只在位于下限时生效）
    pub fn reset(&mut self) -> Result<ResetOutcome, MotionError> {
        let link = self.link.as_mut().ok_or(MotionError::NotConnected)?;
        let result = self.parking.reset(&mut self.controller, link);

        match &result {
            Ok(ResetOutcome::Rehomed(status)) => {
                self.sink.position_changed(status.position(), MotionState::Ok);
            },
            Ok(ResetOutcome::Ignored { .. }) => {},
            Err(e) => {
                self.sink
                    .position_changed(self.controller.position(), MotionState::Alert);
                self.sink
                    .message(MessageLevel::Error, &format!("Reset failed: {e}"));
            },
        }
        result
    }

    /// 同步位置计数（不发送命令）
    pub fn sync(&mut self, position: u32) -> Result<(), ConfigError> {
        self.controller.sync(position)?;
        self.sink.position_changed(position, MotionState::Ok);
        Ok(())
    }

    // ========================================================================
    // 配置
    // ========================================================================

    pub fn set_backlash(&mut self, steps: u32) -> Result<(), ConfigError> {
        self.stepping.set_backlash(steps)?;
        self.sink.backlash_changed(steps);
        self.sink
            .message(MessageLevel::Info, &format!("Backlash set to {steps}"));
        Ok(())
    }

    pub fn set_parking(&mut self, enabled: bool) {
        self.parking.set_enabled(enabled);
        self.sink.parking_changed(enabled);
    }

    /// 保存预设位（值必须在行程内）
    pub fn set_preset(&mut self, slot: usize, position: u32) -> Result<(), ConfigError> {
        let limits = self.controller.limits();
        let entry = self
            .presets
            .get_mut(slot)
            .ok_or(ConfigError::UnknownPreset(slot))?;

        if !limits.contains(position) {
            return Err(ConfigError::PresetOutOfRange {
                slot,
                value: position,
                min: limits.min(),
                max: limits.max(),
            });
        }

        *entry = position;
        debug!("Preset {} = {}", slot, position);
        Ok(())
    }

    /// 相对移动步长（不超过行程跨度）
    pub fn set_relative_step(&mut self, ticks: u32) -> Result<(), ConfigError> {
        check_relative_step(ticks, self.controller.limits())?;
        self.relative_step = ticks;
        Ok(())
    }

    /// 应用已保存的配置（不写设备）
    ///
    /// 细分模式只更新本地状态；连接后需要重新选择才会下发。
    pub fn apply_settings(&mut self, settings: &FocuserSettings) -> Result<(), ConfigError> {
        settings.validate()?;

        // 配置只保存上限，下限沿用当前行程
        let current = self.controller.limits();
        let limits = TravelLimits::new(current.min(), settings.max_position)?;
        check_relative_step(settings.relative_step, limits)?;

        let position = match settings.position {
            Some(position) => position,
            None => self.controller.position().min(limits.max()),
        };
        if !limits.contains(position) {
            return Err(ConfigError::PositionOutOfRange {
                value: position,
                min: limits.min(),
                max: limits.max(),
            });
        }

        // 以上全部校验通过后再提交
        self.controller.force_position(position.min(current.max()));
        self.controller.set_limits(limits)?;
        self.controller.sync(position)?;

        self.stepping.set_max_backlash(limits.max_backlash());
        self.stepping.set_backlash(settings.backlash)?;
        self.stepping.restore_mode(settings.step_mode);
        self.baud = settings.baud_rate();
        // 低于下限的预设位抬到下限
        self.presets = settings.presets.map(|preset| preset.max(limits.min()));
        self.relative_step = settings.relative_step;
        self.parking.set_enabled(settings.parking_enabled);

        debug!("{}: settings applied", self.name);
        Ok(())
    }

    /// 导出当前配置；只有启用停放时才包含位置
    pub fn settings(&self) -> FocuserSettings {
        FocuserSettings {
            max_position: self.controller.limits().max(),
            backlash: self.stepping.backlash(),
            step_mode: self.stepping.mode(),
            baud_index: self.baud.index(),
            relative_step: self.relative_step,
            presets: self.presets,
            parking_enabled: self.parking.enabled(),
            position: self
                .parking
                .enabled()
                .then(|| self.controller.position()),
        }
    }

    // ========================================================================
    // 内部
    // ========================================================================

    fn report_motion(&mut self, result: &Result<PositionStatus, MotionError>) {
        match result {
            Ok(PositionStatus::Moved { to, .. }) => {
                self.sink.position_changed(*to, MotionState::Ok);
            },
            Ok(PositionStatus::AlreadyAtTarget { .. }) => {},
            Err(e @ MotionError::Transport(_)) => {
                self.sink
                    .position_changed(self.controller.position(), MotionState::Alert);
                self.sink.message(MessageLevel::Error, &e.to_string());
            },
            Err(e) => {
                self.sink.message(MessageLevel::Warning, &e.to_string());
            },
        }
    }
}

impl<T: SerialTransport> Default for TicFocuser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SerialTransport> Focuser for TicFocuser<T> {
    fn move_absolute(&mut self, target: u32) -> Result<PositionStatus, MotionError> {
        let link = self.link.as_mut().ok_or(MotionError::NotConnected)?;
        let result = self.controller.move_absolute(link, target);
        self.report_motion(&result);
        result
    }

    fn move_relative(
        &mut self,
        direction: FocusDirection,
        ticks: u32,
    ) -> Result<PositionStatus, MotionError> {
        let link = self.link.as_mut().ok_or(MotionError::NotConnected)?;
        let result = self.controller.move_relative(link, direction, ticks);
        self.report_motion(&result);
        result
    }

    fn set_step_mode(&mut self, mode: StepMode) -> Result<(), ModeError> {
        let result = self.stepping.set_step_mode(self.link.as_mut(), mode);

        match &result {
            Ok(()) => self.sink.step_mode_changed(mode, MotionState::Ok),
            Err(ModeError::TransportFailure { active, source }) => {
                self.sink.step_mode_changed(*active, MotionState::Alert);
                self.sink.message(
                    MessageLevel::Error,
                    &format!("Failed to set {mode} step: {source}"),
                );
            },
            Err(ModeError::NotConnected) => {},
        }
        result
    }

    fn set_baud_rate(&mut self, index: usize) -> Result<BaudRate, BaudError> {
        let link = self.link.as_mut().ok_or(BaudError::NotConnected)?;
        let rate = encode_set_baud_rate(index);

        if let Err(source) = link.set_baud(rate.bits_per_second()) {
            warn!("Failed to set baud rate {}: {}", rate, source);
            self.sink.message(
                MessageLevel::Error,
                &format!("Failed to set baud rate {rate}: {source}"),
            );
            return Err(BaudError::TransportFailure {
                active: self.baud,
                source,
            });
        }

        self.baud = rate;
        info!("Baud rate set to {}", rate);
        Ok(rate)
    }
}

impl<T: SerialTransport> std::fmt::Debug for TicFocuser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicFocuser")
            .field("name", &self.name)
            .field("connected", &self.is_connected())
            .field("position", &self.controller.position())
            .field("step_mode", &self.stepping.mode())
            .field("backlash", &self.stepping.backlash())
            .field("parking", &self.parking.enabled())
            .finish()
    }
}

fn check_relative_step(ticks: u32, limits: TravelLimits) -> Result<(), ConfigError> {
    let span = limits.max() - limits.min();
    if ticks > span {
        return Err(ConfigError::RelativeStepOutOfRange {
            value: ticks,
            max: span,
        });
    }
    Ok(())
}
