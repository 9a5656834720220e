//! # Tic Protocol
//!
//! Tic 步进电机控制器串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 命令字节常量定义
//! - `constants`: 行程、延时等协议常量
//! - `control`: 控制帧构建（safe-start、目标位置、细分模式）
//! - `config`: 串口线路配置（波特率）
//!
//! ## Compact protocol
//!
//! 每个负载字节的最高位保留给帧同步，多字节数值需要拆成 7-bit 字段，
//! 被剥离的最高位统一打包在命令字节之后的第一个字节中。
//! 协议只写不读，没有应答帧。

pub mod config;
pub mod constants;
pub mod control;
pub mod ids;

// 重新导出常用类型
pub use config::*;
pub use constants::*;
pub use control::*;
pub use ids::*;

use thiserror::Error;

/// 最长命令帧长度（set-target-position：1 + 1 + 4）
pub const MAX_FRAME_LEN: usize = 6;

/// Tic 命令帧
///
/// 协议层和串口层之间的中间抽象：
///
/// ```text
/// Protocol Layer (tic-protocol)
///     ↓ TicCommand::to_frame()
/// TicFrame (此类型)
///     ↓ SerialTransport::write_frame()
/// Serial Layer (tic-serial)
/// ```
///
/// 固定 6 字节缓冲区 + 有效长度，`Copy`，不做堆分配。
///
/// ```rust
/// use tic_protocol::TicFrame;
///
/// let frame = TicFrame::new(&[0x94, 0x02]);
/// assert_eq!(frame.len(), 2);
/// assert_eq!(frame.as_bytes(), &[0x94, 0x02]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicFrame {
    data: [u8; MAX_FRAME_LEN],
    len: u8,
}

impl TicFrame {
    /// 从字节切片创建帧（超出 6 字节的部分被截断）
    pub fn new(bytes: &[u8]) -> Self {
        let mut data = [0u8; MAX_FRAME_LEN];
        let len = bytes.len().min(MAX_FRAME_LEN);
        data[..len].copy_from_slice(&bytes[..len]);

        Self {
            data,
            len: len as u8,
        }
    }

    /// 有效字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 命令字节（第一个字节）
    pub fn command(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for TicFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Display for TicFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// 协议错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unexpected command byte: 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedCommand { expected: u8, actual: u8 },

    #[error("Payload byte {index} has framing bit set: 0x{value:02X}")]
    FramingBitSet { index: usize, value: u8 },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },

    #[error("Parse error: {0}")]
    ParseError(String),
}
