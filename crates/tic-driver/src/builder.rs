//! Builder 模式实现
//!
//! 提供链式构造 `TicFocuser` 实例的便捷方式。

use crate::error::ConfigError;
use crate::focuser::TicFocuser;
use crate::sink::{StatusSink, TracingSink};
use crate::state::TravelLimits;
use tic_protocol::DEFAULT_DEVICE_NAME;
use tic_serial::SerialTransport;
use tic_tools::FocuserSettings;

/// TicFocuser Builder（链式构造）
///
/// # Example
///
/// ```
/// use tic_driver::{TicFocuserBuilder, TravelLimits};
/// use tic_serial::MockTransport;
///
/// let focuser = TicFocuserBuilder::new()
///     .name("Main Focuser")
///     .limits(TravelLimits::up_to(20_000))
///     .build::<MockTransport>()
///     .unwrap();
///
/// assert_eq!(focuser.name(), "Main Focuser");
/// assert_eq!(focuser.limits().max(), 20_000);
/// ```
#[derive(Default)]
pub struct TicFocuserBuilder {
    /// 设备名称（默认 "TIC Focuser"）
    name: Option<String>,
    /// 行程范围（默认 `[0, 10000]`，提供配置时由 `max_position` 决定）
    limits: Option<TravelLimits>,
    /// 启动时应用的配置
    settings: Option<FocuserSettings>,
    /// 状态接收器（默认写日志）
    sink: Option<Box<dyn StatusSink>>,
}

impl TicFocuserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn limits(mut self, limits: TravelLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn settings(mut self, settings: FocuserSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// 构建会话（未连接）
    ///
    /// 同时给出 `limits` 和 `settings` 时，以 `limits` 为准。
    pub fn build<T: SerialTransport>(self) -> Result<TicFocuser<T>, ConfigError> {
        let name = self.name.unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(TracingSink::new(name.clone())));

        let limits = self.limits.unwrap_or_default();
        let mut focuser = TicFocuser::from_parts(name, limits, sink);

        if let Some(mut settings) = self.settings {
            if self.limits.is_some() {
                settings.max_position = limits.max();
            }
            focuser.apply_settings(&settings)?;
        }

        Ok(focuser)
    }
}
