//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use tic_sdk::prelude::*;
//! ```

// 会话与能力接口
pub use tic_driver::{
    CommandOutcome, FocusDirection, Focuser, FocuserCommand, MotionState, ParkOutcome,
    PositionStatus, ResetOutcome, StatusSink, TicFocuser, TicFocuserBuilder, TravelLimits,
};

// 协议类型
pub use tic_protocol::{BaudRate, StepMode};

// 串口层（常用 Trait）
pub use tic_serial::SerialTransport;
#[cfg(feature = "native")]
pub use tic_serial::{SerialPortConfig, SerialPortTransport};

// 配置
pub use tic_tools::{FocuserSettings, SettingsStore, TomlSettingsStore};

// 错误类型
pub use tic_driver::{BaudError, ConfigError, DriverError, ModeError, MotionError};
pub use tic_protocol::ProtocolError;
pub use tic_serial::SerialError;
pub use tic_tools::SettingsError;
