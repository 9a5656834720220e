//! 串口线路配置
//!
//! 波特率只作用于串口线路，不作为带内命令发送给控制器。

use std::fmt;

/// 串口波特率（按索引选择）
///
/// 索引 0..=4 依次对应 9600..115200；越界索引回落到 115200。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive)]
#[repr(u8)]
pub enum BaudRate {
    B9600 = 0,
    B19200 = 1,
    B38400 = 2,
    B57600 = 3,
    /// 默认值
    #[default]
    B115200 = 4,
}

impl BaudRate {
    /// 所有波特率，按索引排列
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// 默认索引
    pub const DEFAULT_INDEX: u8 = BaudRate::B115200 as u8;

    /// 从索引选择波特率（越界 → 115200）
    pub fn from_index(index: usize) -> Self {
        u8::try_from(index).map(BaudRate::from).unwrap_or_default()
    }

    /// 在 `ALL` 中的索引
    pub fn index(self) -> u8 {
        self as u8
    }

    /// 每秒比特数
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
        }
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

/// 索引 → 波特率
pub fn encode_set_baud_rate(index: usize) -> BaudRate {
    BaudRate::from_index(index)
}
