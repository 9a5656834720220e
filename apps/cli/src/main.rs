//! # Tic CLI
//!
//! Command-line interface for Tic stepper focusers.
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于脚本）
//!
//! ```bash
//! # 配置默认串口
//! tic-cli config set --port /dev/ttyACM0
//!
//! # 启用停放后才会保存位置，one-shot 移动依赖它
//! tic-cli park on
//!
//! # 执行操作（内部：连接 -> 移动 -> 释放串口，不停放）
//! tic-cli move 5000
//! tic-cli in 50
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ tic-cli shell
//! tic> connect /dev/ttyACM0
//! tic> move 9999
//! tic> in 50
//! tic> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod modes;
mod parse;
mod utils;

use commands::config::CliConfig;
use commands::{ConfigCommand, FocusCommand};
use modes::oneshot::OneShotMode;
use modes::repl::run_repl;

/// Tic CLI - 调焦器命令行工具
#[derive(Parser, Debug)]
#[command(name = "tic-cli")]
#[command(about = "Command-line interface for Tic stepper focusers", long_about = None)]
#[command(version)]
struct Cli {
    /// 串口设备（覆盖配置）
    #[arg(long)]
    port: Option<String>,

    /// 波特率索引（覆盖配置）
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    baud: Option<u8>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 显示已保存的调焦器配置
    Status,

    /// 启动交互式 Shell（REPL 模式）
    Shell,

    #[command(flatten)]
    Focus(FocusCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tic_sdk::init_logger("tic_cli=info")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => {
            // One-shot 模式：配置管理
            cmd.execute()
        },

        Commands::Status => {
            let mode = OneShotMode::new(cli.port, cli.baud)?;
            mode.status()
        },

        Commands::Shell => {
            // REPL 模式：交互式 Shell
            let config = CliConfig::load()?.with_overrides(cli.port, cli.baud);
            run_repl(config)
        },

        Commands::Focus(cmd) => {
            // One-shot 模式：调焦器命令
            let mut mode = OneShotMode::new(cli.port, cli.baud)?;
            mode.execute(cmd.into_command())
        },
    }
}
