//! Tic Focuser SDK - Pololu Tic 步进电机调焦器 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): Tic 紧凑协议的命令编码
//! - **串口层** (`serial`): 串口硬件抽象（真实串口 / Mock）
//! - **驱动层** (`driver`): 位置控制、细分模式、停放策略、会话
//! - **工具层** (`tools`): 持久化配置
//!
//! # 快速开始
//!
//! ```rust
//! use tic_sdk::prelude::*;
//! ```

pub mod logging;
pub mod prelude;

/// 协议层
pub mod protocol {
    pub use tic_protocol::*;
}

/// 串口层
pub mod serial {
    pub use tic_serial::*;
}

/// 驱动层
pub mod driver {
    pub use tic_driver::*;
}

/// 工具层
pub mod tools {
    pub use tic_tools::*;
}

// --- 用户以此为界 ---

pub use logging::{LoggerError, init_logger};
pub use tic_driver::{
    DriverError, Focuser, FocuserCommand, MotionError, TicFocuser, TicFocuserBuilder,
};
pub use tic_protocol::{BaudRate, ProtocolError, StepMode};
pub use tic_serial::{SerialError, SerialTransport};
pub use tic_tools::{FocuserSettings, SettingsStore, TomlSettingsStore};
