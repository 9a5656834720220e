//! 命令字节常量定义
//!
//! Tic compact protocol 的命令字节（第一个字节，最高位为 1）。

/// Exit safe start（无负载）
pub const CMD_EXIT_SAFE_START: u8 = 0x83;

/// Set target position（32-bit 负载）
pub const CMD_SET_TARGET_POSITION: u8 = 0xE0;

/// Set step mode（7-bit 负载）
pub const CMD_SET_STEP_MODE: u8 = 0x94;

/// 命令类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// 运动相关命令（safe-start、目标位置）
    Motion,
    /// 设置类命令（细分模式）
    Setting,
    /// 未知命令
    Unknown,
}

impl CommandType {
    /// 从命令字节识别命令类型
    pub fn from_command(command: u8) -> Self {
        match command {
            CMD_EXIT_SAFE_START | CMD_SET_TARGET_POSITION => CommandType::Motion,
            CMD_SET_STEP_MODE => CommandType::Setting,
            _ => CommandType::Unknown,
        }
    }
}
