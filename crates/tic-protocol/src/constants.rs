//! 协议常量定义
//!
//! 集中定义行程、延时等常量，避免在代码中散落"魔法数"。

/// 默认最大行程（步），最小行程为 0
pub const MAX_STEPS: u32 = 10_000;

/// 定时调焦时每步耗时（毫秒）
pub const STEP_DELAY_MS: u64 = 4;

/// 预设位数量
pub const PRESET_COUNT: usize = 3;

/// 设备默认名称
pub const DEFAULT_DEVICE_NAME: &str = "TIC Focuser";

/// 驱动版本（major, minor）
pub const DRIVER_VERSION: (u16, u16) = (1, 0);

/// 回差上限：行程的 1/100
pub const fn max_backlash(max_steps: u32) -> u32 {
    max_steps / 100
}

/// 复位时使用的名义位置：行程的 1/100
pub const fn nominal_reset_position(max_steps: u32) -> u32 {
    max_steps / 100
}
