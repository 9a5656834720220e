//! 状态通知接口
//!
//! 会话把位置、模式、连接变化推送给宿主（INDI 风格的属性界面、CLI 等）。
//! 默认实现 `TracingSink` 只写日志。

use crate::state::MotionState;
use tic_protocol::StepMode;
use tracing::{error, info, warn};

/// 通知消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// 状态接收器
pub trait StatusSink {
    /// 位置或位置状态变化
    fn position_changed(&mut self, position: u32, state: MotionState);

    /// 细分模式变化（失败时报告仍然生效的模式和 `Alert`）
    fn step_mode_changed(&mut self, mode: StepMode, state: MotionState);

    fn backlash_changed(&mut self, _steps: u32) {}

    fn parking_changed(&mut self, _enabled: bool) {}

    /// 断开连接后，所有设备属性从界面移除
    fn properties_removed(&mut self) {}

    fn message(&mut self, level: MessageLevel, text: &str);
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn position_changed(&mut self, position: u32, state: MotionState) {
        (**self).position_changed(position, state)
    }

    fn step_mode_changed(&mut self, mode: StepMode, state: MotionState) {
        (**self).step_mode_changed(mode, state)
    }

    fn backlash_changed(&mut self, steps: u32) {
        (**self).backlash_changed(steps)
    }

    fn parking_changed(&mut self, enabled: bool) {
        (**self).parking_changed(enabled)
    }

    fn properties_removed(&mut self) {
        (**self).properties_removed()
    }

    fn message(&mut self, level: MessageLevel, text: &str) {
        (**self).message(level, text)
    }
}

/// 写日志的默认接收器
#[derive(Debug, Clone)]
pub struct TracingSink {
    device: String,
}

impl TracingSink {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tic_protocol::DEFAULT_DEVICE_NAME)
    }
}

impl StatusSink for TracingSink {
    fn position_changed(&mut self, position: u32, state: MotionState) {
        info!(device = %self.device, ?state, "position {}", position);
    }

    fn step_mode_changed(&mut self, mode: StepMode, state: MotionState) {
        info!(device = %self.device, ?state, "step mode {}", mode);
    }

    fn backlash_changed(&mut self, steps: u32) {
        info!(device = %self.device, "backlash {}", steps);
    }

    fn parking_changed(&mut self, enabled: bool) {
        info!(device = %self.device, "parking {}", if enabled { "enabled" } else { "disabled" });
    }

    fn properties_removed(&mut self) {
        info!(device = %self.device, "properties removed");
    }

    fn message(&mut self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Info => info!(device = %self.device, "{}", text),
            MessageLevel::Warning => warn!(device = %self.device, "{}", text),
            MessageLevel::Error => error!(device = %self.device, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        positions: usize,
        messages: usize,
    }

    impl StatusSink for Counting {
        fn position_changed(&mut self, _position: u32, _state: MotionState) {
            self.positions += 1;
        }

        fn step_mode_changed(&mut self, _mode: StepMode, _state: MotionState) {}

        fn message(&mut self, _level: MessageLevel, _text: &str) {
            self.messages += 1;
        }
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut sink: Box<Counting> = Box::default();
        sink.position_changed(1, MotionState::Ok);
        StatusSink::message(&mut sink, MessageLevel::Info, "hello");
        sink.properties_removed();
        assert_eq!(sink.positions, 1);
        assert_eq!(sink.messages, 1);
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let mut sink = TracingSink::default();
        sink.position_changed(10, MotionState::Busy);
        sink.step_mode_changed(StepMode::Full, MotionState::Alert);
        sink.message(MessageLevel::Error, "failure");
    }
}
