//! # Tic Tools - 共享数据结构
//!
//! **依赖原则**: 只依赖 `tic-protocol`，避免依赖 `tic-driver`
//!
//! ## 包含模块
//!
//! - `settings` - 持久化配置（回差、细分模式、波特率、预设位、停放开关）

pub mod settings;

// 重新导出常用类型
pub use settings::{
    FocuserSettings, MemorySettingsStore, SettingsError, SettingsStore, TomlSettingsStore,
};
