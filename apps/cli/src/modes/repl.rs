//! REPL 模式（交互式 Shell）
//!
//! 会话在多条命令之间保持串口连接；退出时断开（启用停放时先停放）并保存配置。

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tic_sdk::prelude::*;
use tracing::debug;

use crate::commands::config::{CliConfig, config_dir, settings_file};
use crate::modes::oneshot::open_link;
use crate::parse::parse_command;
use crate::utils;

/// REPL 会话（保持调焦器连接）
pub struct ReplSession {
    config: CliConfig,
    store: TomlSettingsStore,
    focuser: TicFocuser<SerialPortTransport>,
}

impl ReplSession {
    /// 创建新会话（读取配置，不连接）
    pub fn new(config: CliConfig) -> Result<Self> {
        let store = TomlSettingsStore::new(settings_file()?);
        let settings = store.load().context("读取调焦器配置失败")?;
        let focuser = TicFocuserBuilder::new()
            .settings(settings)
            .build()
            .context("调焦器配置无效")?;

        Ok(Self {
            config,
            store,
            focuser,
        })
    }

    /// 连接到调焦器
    pub fn connect(&mut self, port: Option<&str>) -> Result<()> {
        if self.focuser.is_connected() {
            println!("⚠️  已经连接");
            return Ok(());
        }

        if let Some(port) = port {
            self.config.port = Some(port.to_string());
        }

        let link = open_link(&self.config, self.focuser.baud_rate())?;
        self.focuser.connect(link);
        self.focuser.handshake()?;
        println!("✅ 已连接");
        Ok(())
    }

    /// 断开连接
    pub fn disconnect(&mut self) -> Result<()> {
        if !self.focuser.is_connected() {
            println!("⚠️  未连接");
            return Ok(());
        }

        println!("⏳ 断开连接...");
        let outcome = self.focuser.disconnect()?;
        utils::print_park_outcome(&outcome);
        self.save()?;
        println!("✅ 已断开");
        Ok(())
    }

    /// 执行调焦器命令
    pub fn execute(&mut self, command: FocuserCommand) -> Result<()> {
        debug!("Executing {:?}", command);
        let outcome = self.focuser.execute(command)?;
        utils::print_outcome(&outcome);
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        self.store
            .save(&self.focuser.settings())
            .context("保存调焦器配置失败")
    }

    pub fn status(&self) {
        utils::print_status(&self.focuser);
    }

    pub fn is_connected(&self) -> bool {
        self.focuser.is_connected()
    }
}

/// 运行 REPL 模式
pub fn run_repl(config: CliConfig) -> Result<()> {
    let mut session = ReplSession::new(config)?;

    let mut rl = Editor::<(), DefaultHistory>::new()
        .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

    let history_path = config_dir()?.join("history");
    rl.load_history(&history_path).ok(); // 忽略错误（首次运行）

    println!("Tic CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();
    println!("💡 提示: 使用 'connect [port]' 连接到调焦器");
    println!();

    loop {
        let line = match rl.readline("tic> ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            },
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            },
        };

        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match line.as_str() {
            "exit" | "quit" => break,

            "help" => print_help(),

            "status" => session.status(),

            _ => {
                if let Err(err) = handle_command(&line, &mut session) {
                    eprintln!("❌ Error: {:#}", err);
                    print_help_hint(&line);
                }
            },
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    rl.save_history(&history_path).ok();

    if session.is_connected() {
        session.disconnect()?;
    } else {
        session.save()?;
    }

    println!("👋 再见！");
    Ok(())
}

/// 处理命令
fn handle_command(line: &str, session: &mut ReplSession) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.first().copied() {
        None => Ok(()),

        Some("connect") => session.connect(parts.get(1).copied()),

        Some("disconnect") => session.disconnect(),

        Some("save") => {
            session.save()?;
            println!("✅ 配置已保存");
            Ok(())
        },

        Some(_) => {
            let command = parse_command(&parts)?;
            session.execute(command)
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  connect [port]                连接到调焦器（可选串口）");
    println!("  disconnect                    断开连接（启用停放时先停放）");
    println!("  move <position>               移动到绝对位置");
    println!("  in [ticks] / out [ticks]      相对移动（默认使用相对步数）");
    println!("  timed <in|out> <ms>           定时移动");
    println!("  mode <quarter|half|full>      设置细分模式");
    println!("  baud <0-4>                    设置串口波特率");
    println!("  backlash <steps>              设置回差");
    println!("  step <ticks>                  设置默认相对步数");
    println!("  preset set <slot> <position>  保存预设位");
    println!("  preset goto <slot>            移动到预设位");
    println!("  park <on|off>                 断开前停放");
    println!("  reset                         在最小位置处复位");
    println!("  sync <position>               同步位置计数");
    println!("  status                        查询状态");
    println!("  save                          保存配置");
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
}

/// 打印帮助提示
fn print_help_hint(line: &str) {
    let cmd = line.split_whitespace().next().unwrap_or("");
    match cmd {
        "move" | "goto" => println!("💡 用法: move <position>"),
        "timed" => println!("💡 用法: timed <in|out> <ms>"),
        "mode" => println!("💡 用法: mode <quarter|half|full>"),
        "preset" => println!("💡 用法: preset set <slot> <position> | preset goto <slot>"),
        _ => println!("💡 输入 'help' 查看可用命令"),
    }
}
