//! # 持久化配置
//!
//! 启动时读取 {回差, 细分模式, 波特率索引, 预设位, 停放开关}，
//! 按需写回同一组数据；当前位置只在启用停放时才写入
//! （未停放的执行器重启后位置不可信）。

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tic_protocol::{BaudRate, MAX_STEPS, PRESET_COUNT, StepMode, max_backlash};
use tracing::debug;

/// 配置错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting {field}: {value} (allowed 0..={max})")]
    Invalid {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

/// 调焦器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocuserSettings {
    /// 最大行程（步）
    pub max_position: u32,

    /// 回差补偿（步），上限为行程的 1/100
    pub backlash: u32,

    /// 细分模式
    pub step_mode: StepMode,

    /// 波特率索引（0..=4）
    pub baud_index: u8,

    /// 相对移动的默认步数
    pub relative_step: u32,

    /// 预设位
    pub presets: [u32; PRESET_COUNT],

    /// 断开连接前是否停放到最小位置
    pub parking_enabled: bool,

    /// 当前位置（仅在启用停放时保存）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Default for FocuserSettings {
    fn default() -> Self {
        Self {
            max_position: MAX_STEPS,
            backlash: 0,
            step_mode: StepMode::default(),
            baud_index: BaudRate::DEFAULT_INDEX,
            relative_step: MAX_STEPS / 100,
            presets: [0; PRESET_COUNT],
            parking_enabled: false,
            position: None,
        }
    }
}

impl FocuserSettings {
    /// 检查所有值是否在允许范围内
    pub fn validate(&self) -> Result<(), SettingsError> {
        let max = self.max_position;
        check("backlash", self.backlash, max_backlash(max))?;
        check("relative_step", self.relative_step, max)?;
        for preset in self.presets {
            check("presets", preset, max)?;
        }
        if let Some(position) = self.position {
            check("position", position, max)?;
        }
        Ok(())
    }

    pub fn baud_rate(&self) -> BaudRate {
        BaudRate::from_index(self.baud_index as usize)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn check(field: &'static str, value: u32, max: u32) -> Result<(), SettingsError> {
    if value > max {
        return Err(SettingsError::Invalid { field, value, max });
    }
    Ok(())
}

/// 配置存储接口
pub trait SettingsStore {
    fn load(&self) -> Result<FocuserSettings, SettingsError>;
    fn save(&mut self, settings: &FocuserSettings) -> Result<(), SettingsError>;
}

/// TOML 文件存储
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    /// 文件不存在时返回默认配置
    fn load(&self) -> Result<FocuserSettings, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(FocuserSettings::default());
            },
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            },
        };

        let settings = FocuserSettings::from_toml_str(&content)?;
        debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    fn save(&mut self, settings: &FocuserSettings) -> Result<(), SettingsError> {
        let io_err = |source: io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = format!("# Tic focuser settings\n\n{}", settings.to_toml_string()?);
        fs::write(&self.path, content).map_err(io_err)?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// 内存存储（测试或嵌入使用）
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Option<FocuserSettings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次保存的内容
    pub fn saved(&self) -> Option<&FocuserSettings> {
        self.settings.as_ref()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<FocuserSettings, SettingsError> {
        Ok(self.settings.clone().unwrap_or_default())
    }

    fn save(&mut self, settings: &FocuserSettings) -> Result<(), SettingsError> {
        self.settings = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = FocuserSettings::default();
        assert_eq!(settings.max_position, 10_000);
        assert_eq!(settings.step_mode, StepMode::Half);
        assert_eq!(settings.baud_rate(), BaudRate::B115200);
        assert_eq!(settings.relative_step, 100);
        assert!(!settings.parking_enabled);
        assert!(settings.position.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let settings = FocuserSettings {
            backlash: 101,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "backlash", value: 101, max: 100 })
        ));

        let settings = FocuserSettings {
            presets: [0, 10_001, 0],
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "presets", .. })
        ));

        let settings = FocuserSettings {
            position: Some(20_000),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = FocuserSettings::from_toml_str(
            r#"
backlash = 12
step_mode = "quarter"
parking_enabled = true
position = 500
"#,
        )
        .unwrap();

        assert_eq!(settings.backlash, 12);
        assert_eq!(settings.step_mode, StepMode::Quarter);
        assert!(settings.parking_enabled);
        assert_eq!(settings.position, Some(500));
        assert_eq!(settings.max_position, 10_000);
        assert_eq!(settings.baud_index, 4);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = FocuserSettings::from_toml_str("step_mode = \"sixteenth\"");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_position_omitted_when_none() {
        let text = FocuserSettings::default().to_toml_string().unwrap();
        assert!(!text.contains("position ="));
        assert!(text.contains("step_mode = \"half\""));
    }

    #[test]
    fn test_toml_store_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("missing.toml"));
        assert_eq!(store.load().unwrap(), FocuserSettings::default());
    }

    #[test]
    fn test_toml_store_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = TomlSettingsStore::new(dir.path().join("nested/focuser.toml"));

        let settings = FocuserSettings {
            backlash: 25,
            step_mode: StepMode::Full,
            baud_index: 1,
            presets: [100, 2_000, 9_000],
            parking_enabled: true,
            position: Some(0),
            ..Default::default()
        };
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.baud_rate(), BaudRate::B19200);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemorySettingsStore::new();
        assert!(store.saved().is_none());
        assert_eq!(store.load().unwrap(), FocuserSettings::default());

        let settings = FocuserSettings {
            backlash: 3,
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap().backlash, 3);
    }
}
