//! 日志初始化
//!
//! 安装 `tracing` 全局订阅者，并把 `log` crate 的记录桥接进来。
//! 过滤规则取自 `RUST_LOG`，未设置时使用传入的默认指令。

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to install log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 构建过滤器：`RUST_LOG` 优先，否则使用 `default_directive`
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggerError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_directive)?),
    }
}

/// 初始化日志（进程内只能调用一次）
///
/// ```no_run
/// tic_sdk::init_logger("tic_driver=info").unwrap();
/// ```
pub fn init_logger(default_directive: &str) -> Result<(), LoggerError> {
    let filter = env_filter(default_directive)?;

    tracing_log::LogTracer::init()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
