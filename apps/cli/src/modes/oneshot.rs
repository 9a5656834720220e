//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接调焦器（仅在命令需要串口时）
//! 3. 执行操作
//! 4. 释放串口（不停放，位置留给下一条命令）
//! 5. 保存配置
//!
//! 移动命令依赖上一次保存的位置，因此只有启用停放（配置中保存了位置）时才可用；
//! 否则请使用 `tic-cli shell`。

use anyhow::{Context, Result, bail};
use tic_sdk::prelude::*;
use tracing::debug;

use crate::commands::config::{CliConfig, settings_file};
use crate::utils;

/// One-shot 模式
pub struct OneShotMode {
    config: CliConfig,
    store: TomlSettingsStore,
}

impl OneShotMode {
    /// 加载 CLI 配置并合并命令行覆盖
    pub fn new(port: Option<String>, baud_index: Option<u8>) -> Result<Self> {
        let config = CliConfig::load()?.with_overrides(port, baud_index);
        let store = TomlSettingsStore::new(settings_file()?);
        Ok(Self { config, store })
    }

    /// 执行一条调焦器命令
    pub fn execute(&mut self, command: FocuserCommand) -> Result<()> {
        let settings = self.store.load().context("读取调焦器配置失败")?;
        ensure_known_position(&command, &settings)?;

        let mut focuser = TicFocuserBuilder::new()
            .settings(settings)
            .build::<SerialPortTransport>()
            .context("调焦器配置无效")?;

        let result = if command.requires_connection() {
            let link = open_link(&self.config, focuser.baud_rate())?;
            focuser.connect(link);
            println!("✅ 已连接");

            debug!("Executing {:?}", command);
            let result = focuser.execute(command);
            focuser.release().context("断开连接失败")?;
            debug!("Released at {}", focuser.position());
            result
        } else {
            focuser.execute(command)
        };

        self.store
            .save(&focuser.settings())
            .context("保存调焦器配置失败")?;

        let outcome = result?;
        utils::print_outcome(&outcome);
        Ok(())
    }

    /// 显示已保存的配置（不连接设备）
    pub fn status(&self) -> Result<()> {
        let settings = self.store.load().context("读取调焦器配置失败")?;

        println!("📊 {}", tic_sdk::protocol::DEFAULT_DEVICE_NAME);
        println!("  串口: {}", self.config.port());
        utils::print_settings(&settings);
        Ok(())
    }
}

/// 打开串口（CLI 配置中的波特率覆盖优先）
pub fn open_link(config: &CliConfig, baud: BaudRate) -> Result<SerialPortTransport> {
    let rate = config.baud_rate().unwrap_or(baud);
    println!("⏳ 连接到调焦器 {} ({} baud)...", config.port(), rate);

    let port_config = SerialPortConfig::new(config.port())
        .baud_rate(rate)
        .timeout(config.timeout());

    SerialPortTransport::open(&port_config)
        .with_context(|| format!("打开串口 {} 失败", config.port()))
}

/// 移动命令需要已保存的当前位置
fn ensure_known_position(command: &FocuserCommand, settings: &FocuserSettings) -> Result<()> {
    if command.moves_focuser() && settings.position.is_none() {
        bail!(
            "当前位置未知：one-shot 移动需要已保存的位置。\n\
             请先执行 `tic-cli park on`（必要时用 `tic-cli sync <位置>` 校准），\
             或使用 `tic-cli shell` 在同一会话中移动"
        );
    }
    Ok(())
}
