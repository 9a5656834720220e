//! 配置管理命令
//!
//! 用于管理 CLI 配置（串口路径、波特率覆盖、写超时）

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tic_sdk::BaudRate;

/// 配置目录
pub fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("tic-focuser");
    Ok(path)
}

/// CLI 配置文件
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// 调焦器配置文件（回差、细分模式、预设位等）
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("focuser.toml"))
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认串口
    pub port: Option<String>,

    /// 波特率索引覆盖（0..=4，未设置时使用调焦器配置）
    pub baud_index: Option<u8>,

    /// 写超时（毫秒）
    pub timeout_ms: Option<u64>,
}

impl CliConfig {
    pub const DEFAULT_PORT: &'static str = "/dev/ttyACM0";
    pub const DEFAULT_TIMEOUT_MS: u64 = 500;

    /// 加载配置（文件不存在时返回默认值）
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("读取配置文件失败")?;
        toml::from_str(&content).context("解析配置文件失败")
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        let content = format!(
            "# Tic Focuser CLI Configuration\n\n{}",
            toml::to_string_pretty(self).context("序列化配置失败")?
        );
        fs::write(path, content).context("写入配置文件失败")?;

        Ok(())
    }

    pub fn port(&self) -> &str {
        self.port.as_deref().unwrap_or(Self::DEFAULT_PORT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(Self::DEFAULT_TIMEOUT_MS))
    }

    /// 波特率覆盖
    pub fn baud_rate(&self) -> Option<BaudRate> {
        self.baud_index.map(|i| BaudRate::from_index(i as usize))
    }

    /// 合并命令行覆盖参数
    pub fn with_overrides(mut self, port: Option<String>, baud_index: Option<u8>) -> Self {
        if port.is_some() {
            self.port = port;
        }
        if baud_index.is_some() {
            self.baud_index = baud_index;
        }
        self
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 串口设备（如 /dev/ttyACM0, COM3）
        #[arg(short, long)]
        port: Option<String>,

        /// 波特率索引（0=9600, 1=19200, 2=38400, 3=57600, 4=115200）
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=4))]
        baud: Option<u8>,

        /// 写超时（毫秒）
        #[arg(short, long)]
        timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（port, baud, timeout, all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                port,
                baud,
                timeout_ms,
            } => Self::set_(port, baud, timeout_ms),

            ConfigCommand::Get { key } => Self::get_(&key),

            ConfigCommand::Check => Self::check_(),
        }
    }

    fn set_(port: Option<String>, baud: Option<u8>, timeout_ms: Option<u64>) -> Result<()> {
        let mut config = CliConfig::load()?;

        if let Some(ref p) = port {
            config.port = Some(p.clone());
            println!("✅ 设置默认串口: {}", p);
        }

        if let Some(index) = baud {
            config.baud_index = Some(index);
            println!("✅ 设置波特率: {}", BaudRate::from_index(index as usize));
        }

        if let Some(ms) = timeout_ms {
            config.timeout_ms = Some(ms);
            println!("✅ 设置写超时: {} ms", ms);
        }

        config.save()?;
        Ok(())
    }

    fn get_(key: &str) -> Result<()> {
        let config = CliConfig::load()?;

        match key {
            "port" => println!("{}", config.port()),

            "baud" => match config.baud_rate() {
                Some(rate) => println!("{}", rate),
                None => println!("(未设置)"),
            },

            "timeout" => println!("{}", config.timeout().as_millis()),

            _ => {
                println!("Tic CLI 配置:");
                println!("  串口: {}", config.port());
                println!("  波特率: {:?}", config.baud_rate().map(|r| r.bits_per_second()));
                println!("  写超时: {} ms", config.timeout().as_millis());
            },
        }

        Ok(())
    }

    fn check_() -> Result<()> {
        let path = config_file()?;
        let config = CliConfig::load()?;

        println!("配置文件: {}", path.display());
        println!("  串口: {}", config.port());
        if !Path::new(config.port()).exists() {
            println!("  ⚠️  串口设备不存在");
        }

        let settings_path = settings_file()?;
        println!("调焦器配置: {}", settings_path.display());
        if !settings_path.exists() {
            println!("  (未创建，使用默认值)");
        }

        Ok(())
    }
}
