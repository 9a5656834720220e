//! # Tic Driver Module
//!
//! 调焦器驱动层：位置控制、细分模式与回差、停放与复位、会话与命令分发。
//!
//! ## 核心组件
//!
//! - `PositionController`: 绝对/相对/定时移动，写入成功才提交位置
//! - `StepModeManager`: 细分模式（失败回滚）与回差
//! - `ParkingPolicy`: 断开前停放、在下限处复位
//! - `TicFocuser`: 独占串口的会话，实现 `Focuser` 能力接口
//! - `StatusSink`: 状态通知（默认 `TracingSink` 写日志）
//!
//! ## 使用示例
//!
//! ```
//! use tic_driver::{Focuser, TicFocuser};
//! use tic_serial::MockTransport;
//!
//! let (link, handle) = MockTransport::with_handle();
//! let mut focuser = TicFocuser::new();
//! focuser.connect(link);
//!
//! focuser.move_absolute(5_000).unwrap();
//! assert_eq!(focuser.position(), 5_000);
//! assert_eq!(handle.write_count(), 2);
//! ```

pub mod builder;
pub mod command;
pub mod error;
pub mod focuser;
pub mod parking;
pub mod position;
pub mod sink;
pub mod state;
pub mod stepping;

pub use builder::TicFocuserBuilder;
pub use command::{CommandOutcome, FocuserCommand};
pub use error::{BaudError, ConfigError, DriverError, ModeError, MotionError};
pub use focuser::{Focuser, TicFocuser};
pub use parking::{ParkOutcome, ParkingPolicy, PolicyPhase, ResetOutcome};
pub use position::{PositionController, timed_ticks};
pub use sink::{MessageLevel, StatusSink, TracingSink};
pub use state::{ConnectionState, FocusDirection, MotionState, PositionStatus, TravelLimits};
pub use stepping::StepModeManager;
