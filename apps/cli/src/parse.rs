//! REPL 输入解析
//!
//! 把一行文本解析为 `FocuserCommand`，会话层只接收解析后的命令。

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;
use tic_sdk::prelude::{FocusDirection, FocuserCommand, StepMode};

/// 解析一条调焦器命令
pub fn parse_command(parts: &[&str]) -> Result<FocuserCommand> {
    let Some((&name, args)) = parts.split_first() else {
        anyhow::bail!("空命令");
    };

    let command = match name {
        "move" | "goto" => FocuserCommand::MoveAbsolute(arg(args, 0, "position")?),

        "in" | "out" => {
            let direction = FocusDirection::from_str(name)?;
            match args.first() {
                Some(_) => FocuserCommand::MoveRelative(direction, arg(args, 0, "ticks")?),
                None => FocuserCommand::Nudge(direction),
            }
        },

        "timed" => {
            let direction: FocusDirection = arg(args, 0, "direction")?;
            let ms: u64 = arg(args, 1, "ms")?;
            FocuserCommand::MoveTimed(direction, Duration::from_millis(ms))
        },

        "mode" => FocuserCommand::SetStepMode(arg::<StepMode>(args, 0, "mode")?),

        "baud" => FocuserCommand::SetBaudRate(arg(args, 0, "index")?),

        "backlash" => FocuserCommand::SetBacklash(arg(args, 0, "steps")?),

        "step" => FocuserCommand::SetRelativeStep(arg(args, 0, "ticks")?),

        "preset" => match args.first().copied() {
            Some("set") => FocuserCommand::SetPreset {
                slot: arg(args, 1, "slot")?,
                position: arg(args, 2, "position")?,
            },
            Some("goto") => FocuserCommand::GotoPreset(arg(args, 1, "slot")?),
            Some(_) => FocuserCommand::GotoPreset(arg(args, 0, "slot")?),
            None => anyhow::bail!("用法: preset set <slot> <position> | preset goto <slot>"),
        },

        "park" => match args.first().copied() {
            Some("on") => FocuserCommand::SetParking(true),
            Some("off") => FocuserCommand::SetParking(false),
            _ => anyhow::bail!("用法: park on|off"),
        },

        "reset" => FocuserCommand::Reset,

        "sync" => FocuserCommand::Sync(arg(args, 0, "position")?),

        other => anyhow::bail!("未知命令: {}", other),
    };

    Ok(command)
}

/// 解析第 `index` 个参数
fn arg<T>(args: &[&str], index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("缺少参数 <{}>", name))?;
    raw.parse::<T>()
        .with_context(|| format!("无效的 <{}>: {}", name, raw))
}
