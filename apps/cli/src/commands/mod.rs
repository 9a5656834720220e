//! 命令定义和实现

pub mod config;
pub mod focus;

pub use config::ConfigCommand;
pub use focus::FocusCommand;
