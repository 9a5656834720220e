//! 输出工具

use tic_sdk::prelude::{
    CommandOutcome, FocuserSettings, ParkOutcome, PositionStatus, ResetOutcome, SerialTransport,
    TicFocuser,
};

/// 打印命令结果
pub fn print_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Motion(status) => print_position_status(status),
        CommandOutcome::Reset(ResetOutcome::Rehomed(status)) => {
            println!("✅ 已复位");
            print_position_status(status);
        },
        CommandOutcome::Reset(ResetOutcome::Ignored { position }) => {
            println!("⚠️  当前位置 {} 不在最小位置，复位未执行", position);
        },
        CommandOutcome::StepMode(mode) => println!("✅ 细分模式: {}", mode),
        CommandOutcome::BaudRate(rate) => println!("✅ 波特率: {}", rate),
        CommandOutcome::Updated => println!("✅ 已更新"),
    }
}

pub fn print_position_status(status: &PositionStatus) {
    match status {
        PositionStatus::Moved { from, to } => println!("✅ 移动 {} -> {}", from, to),
        PositionStatus::AlreadyAtTarget { position } => {
            println!("✅ 已在目标位置 {}", position)
        },
    }
}

pub fn print_park_outcome(outcome: &ParkOutcome) {
    match outcome {
        ParkOutcome::Skipped => {},
        ParkOutcome::Parked(status) => println!("🅿️  已停放到 {}", status.position()),
        ParkOutcome::Failed(e) => eprintln!("⚠️  停放失败: {}", e),
    }
}

/// 打印会话状态
pub fn print_status<T: SerialTransport>(focuser: &TicFocuser<T>) {
    println!("📊 {} ({})", focuser.name(), if focuser.is_connected() { "已连接" } else { "未连接" });
    println!("  位置: {} / {}", focuser.position(), focuser.limits().max());
    println!("  状态: {:?}", focuser.motion_state());
    print_settings(&focuser.settings());
}

/// 打印已保存的配置
pub fn print_settings(settings: &FocuserSettings) {
    println!("  细分模式: {}", settings.step_mode);
    println!("  回差: {}", settings.backlash);
    println!("  波特率: {}", settings.baud_rate());
    println!("  相对步数: {}", settings.relative_step);
    println!("  预设位: {:?}", settings.presets);
    println!("  停放: {}", if settings.parking_enabled { "开" } else { "关" });
    if let Some(position) = settings.position {
        println!("  已保存位置: {}", position);
    }
}
