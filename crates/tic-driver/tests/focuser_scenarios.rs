//! 调焦器端到端场景测试
//!
//! 使用 MockTransport 记录写出的字节，验证会话的完整流程。

use std::sync::{Arc, Mutex};
use tic_driver::*;
use tic_protocol::{StepMode, TicCommand, TicFrame, encode_set_target_position};
use tic_serial::{MockHandle, MockTransport};

/// 记录所有通知的接收器
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Position(u32, MotionState),
    StepMode(StepMode, MotionState),
    Backlash(u32),
    Parking(bool),
    Removed,
    Message(MessageLevel, String),
}

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl StatusSink for RecordingSink {
    fn position_changed(&mut self, position: u32, state: MotionState) {
        self.push(Event::Position(position, state));
    }

    fn step_mode_changed(&mut self, mode: StepMode, state: MotionState) {
        self.push(Event::StepMode(mode, state));
    }

    fn backlash_changed(&mut self, steps: u32) {
        self.push(Event::Backlash(steps));
    }

    fn parking_changed(&mut self, enabled: bool) {
        self.push(Event::Parking(enabled));
    }

    fn properties_removed(&mut self) {
        self.push(Event::Removed);
    }

    fn message(&mut self, level: MessageLevel, text: &str) {
        self.push(Event::Message(level, text.to_string()));
    }
}

fn setup() -> (TicFocuser<MockTransport>, MockHandle, RecordingSink) {
    let sink = RecordingSink::default();
    let mut focuser = TicFocuserBuilder::new()
        .sink(sink.clone())
        .build::<MockTransport>()
        .unwrap();

    let (link, handle) = MockTransport::with_handle();
    focuser.connect(link);
    sink.clear();
    (focuser, handle, sink)
}

fn move_frames(target: u32) -> Vec<TicFrame> {
    vec![
        TicCommand::ExitSafeStart.to_frame(),
        TicCommand::SetTargetPosition(target).to_frame(),
    ]
}

// ============================================================================
// 运动
// ============================================================================

#[test]
fn test_absolute_then_relative_inward() {
    let (mut focuser, handle, _sink) = setup();

    let status = focuser.move_absolute(9_999).unwrap();
    assert_eq!(status, PositionStatus::Moved { from: 0, to: 9_999 });
    assert_eq!(focuser.position(), 9_999);

    let status = focuser.move_relative(FocusDirection::Inward, 50).unwrap();
    assert_eq!(status, PositionStatus::Moved { from: 9_999, to: 9_949 });
    assert_eq!(focuser.position(), 9_949);

    let mut expected = move_frames(9_999);
    expected.extend(move_frames(9_949));
    assert_eq!(handle.frames(), expected);
}

#[test]
fn test_out_of_range_has_no_side_effects() {
    let (mut focuser, handle, sink) = setup();
    focuser.move_absolute(1_000).unwrap();
    handle.clear();
    sink.clear();

    let err = focuser.move_absolute(10_001).unwrap_err();
    assert!(matches!(err, MotionError::OutOfRange { .. }));
    assert!(err.is_refusal());
    assert_eq!(focuser.position(), 1_000);
    assert_eq!(handle.write_count(), 0);
    assert_eq!(handle.flush_count(), 0);

    // 只产生一条警告，不改变位置状态
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Message(MessageLevel::Warning, _)));
}

#[test]
fn test_move_to_current_position_is_noop() {
    let (mut focuser, handle, sink) = setup();

    let status = focuser.move_absolute(0).unwrap();
    assert_eq!(status, PositionStatus::AlreadyAtTarget { position: 0 });
    assert_eq!(handle.write_count(), 0);
    assert_eq!(handle.flush_count(), 0);
    assert!(sink.events().is_empty());
}

#[test]
fn test_transport_failure_keeps_position_and_alerts() {
    let (mut focuser, handle, sink) = setup();
    focuser.move_absolute(2_000).unwrap();
    sink.clear();

    handle.fail_next_write();
    let err = focuser.move_absolute(3_000).unwrap_err();
    assert!(matches!(err, MotionError::Transport(_)));
    assert!(!err.is_refusal());
    assert_eq!(focuser.position(), 2_000);
    assert_eq!(focuser.motion_state(), MotionState::Alert);

    let events = sink.events();
    assert_eq!(events[0], Event::Position(2_000, MotionState::Alert));
    assert!(matches!(events[1], Event::Message(MessageLevel::Error, _)));

    // 没有自动重试；下一次请求正常执行
    focuser.move_absolute(3_000).unwrap();
    assert_eq!(focuser.position(), 3_000);
    assert_eq!(focuser.motion_state(), MotionState::Ok);
}

#[test]
fn test_relative_underflow_rejected() {
    let (mut focuser, handle, _sink) = setup();
    focuser.move_absolute(30).unwrap();
    handle.clear();

    let err = focuser.move_relative(FocusDirection::Inward, 31).unwrap_err();
    assert!(matches!(err, MotionError::OutOfRange { target: -1, .. }));
    assert_eq!(focuser.position(), 30);
    assert_eq!(handle.write_count(), 0);
}

#[test]
fn test_relative_overflow_rejected() {
    let (mut focuser, _handle, _sink) = setup();
    focuser.move_absolute(10_000).unwrap();

    let err = focuser
        .move_relative(FocusDirection::Outward, u32::MAX)
        .unwrap_err();
    assert!(matches!(err, MotionError::OutOfRange { .. }));
    assert_eq!(focuser.position(), 10_000);
}

#[test]
fn test_timed_move() {
    let (mut focuser, handle, _sink) = setup();
    let status = focuser
        .move_timed(FocusDirection::Outward, std::time::Duration::from_millis(2_000))
        .unwrap();
    assert_eq!(status.position(), 500);
    assert_eq!(handle.writes()[1], encode_set_target_position(500).to_vec());
}

// ============================================================================
// 细分模式
// ============================================================================

#[test]
fn test_step_mode_failure_rolls_back() {
    let (mut focuser, handle, sink) = setup();
    assert_eq!(focuser.step_mode(), StepMode::Half);

    handle.fail_writes(true);
    let err = focuser.set_step_mode(StepMode::Full).unwrap_err();
    assert!(matches!(
        err,
        ModeError::TransportFailure { active: StepMode::Half, .. }
    ));
    assert_eq!(focuser.step_mode(), StepMode::Half);
    assert_eq!(sink.events()[0], Event::StepMode(StepMode::Half, MotionState::Alert));
}

#[test]
fn test_step_mode_success() {
    let (mut focuser, handle, sink) = setup();
    focuser.set_step_mode(StepMode::Quarter).unwrap();

    assert_eq!(focuser.step_mode(), StepMode::Quarter);
    assert_eq!(handle.writes(), vec![vec![0x94, 0x03]]);
    assert_eq!(sink.events(), vec![Event::StepMode(StepMode::Quarter, MotionState::Ok)]);
}

#[test]
fn test_backlash_is_pass_through() {
    let (mut focuser, handle, sink) = setup();
    focuser.set_backlash(100).unwrap();
    assert_eq!(focuser.backlash(), 100);
    assert!(sink.events().contains(&Event::Backlash(100)));

    // 回差不影响运动命令
    focuser.move_absolute(500).unwrap();
    focuser.move_absolute(400).unwrap();
    let mut expected = move_frames(500);
    expected.extend(move_frames(400));
    assert_eq!(handle.frames(), expected);

    assert!(matches!(
        focuser.set_backlash(101),
        Err(ConfigError::BacklashOutOfRange { value: 101, max: 100 })
    ));
    assert_eq!(focuser.backlash(), 100);
}

// ============================================================================
// 停放与复位
// ============================================================================

#[test]
fn test_disconnect_parks_when_enabled() {
    let (mut focuser, handle, sink) = setup();
    focuser.set_parking(true);
    focuser.move_absolute(500).unwrap();
    handle.clear();
    sink.clear();

    let outcome = focuser.disconnect().unwrap();
    assert!(outcome.is_parked());
    assert_eq!(handle.frames(), move_frames(0));
    assert_eq!(handle.writes()[0], vec![0x83]);
    assert_eq!(handle.writes()[1], vec![0xE0, 0x00, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(focuser.position(), 0);
    assert!(!focuser.is_connected());

    let events = sink.events();
    assert_eq!(events[0], Event::Position(0, MotionState::Ok));
    assert!(events.contains(&Event::Removed));
}

#[test]
fn test_disconnect_without_parking_sends_nothing() {
    let (mut focuser, handle, _sink) = setup();
    focuser.move_absolute(500).unwrap();
    handle.clear();

    let outcome = focuser.disconnect().unwrap();
    assert!(matches!(outcome, ParkOutcome::Skipped));
    assert_eq!(handle.write_count(), 0);
    assert_eq!(focuser.position(), 500);
    assert!(!focuser.is_connected());
}

#[test]
fn test_disconnect_releases_link_even_if_parking_fails() {
    let (mut focuser, handle, sink) = setup();
    focuser.set_parking(true);
    focuser.move_absolute(500).unwrap();

    handle.fail_writes(true);
    let outcome = focuser.disconnect().unwrap();
    assert!(matches!(outcome, ParkOutcome::Failed(MotionError::Transport(_))));
    assert!(!focuser.is_connected());
    assert_eq!(focuser.position(), 500);
    assert!(sink.events().contains(&Event::Removed));

    // 断开后运动请求被拒绝
    assert!(matches!(focuser.move_absolute(10), Err(MotionError::NotConnected)));
}

#[test]
fn test_reset_away_from_min_is_ignored() {
    let (mut focuser, handle, _sink) = setup();
    focuser.move_absolute(250).unwrap();
    handle.clear();

    let outcome = focuser.reset().unwrap();
    assert_eq!(outcome, ResetOutcome::Ignored { position: 250 });
    assert_eq!(handle.write_count(), 0);
    assert_eq!(focuser.position(), 250);
}

#[test]
fn test_reset_at_min_rehomes() {
    let (mut focuser, handle, _sink) = setup();

    let outcome = focuser.reset().unwrap();
    assert_eq!(
        outcome,
        ResetOutcome::Rehomed(PositionStatus::Moved { from: 100, to: 0 })
    );
    assert_eq!(handle.frames(), move_frames(0));
    assert_eq!(focuser.position(), 0);
    assert_eq!(focuser.policy_phase(), PolicyPhase::Idle);
}

// ============================================================================
// 配置
// ============================================================================

#[test]
fn test_settings_round_trip_through_session() {
    let (mut focuser, _handle, _sink) = setup();
    focuser.set_backlash(20).unwrap();
    focuser.set_step_mode(StepMode::Full).unwrap();
    focuser.set_baud_rate(2).unwrap();
    focuser.set_preset(2, 7_500).unwrap();
    focuser.set_parking(true);
    focuser.move_absolute(6_000).unwrap();

    let settings = focuser.settings();
    assert_eq!(settings.position, Some(6_000));

    let restored = TicFocuserBuilder::new()
        .settings(settings.clone())
        .build::<MockTransport>()
        .unwrap();
    assert_eq!(restored.position(), 6_000);
    assert_eq!(restored.backlash(), 20);
    assert_eq!(restored.step_mode(), StepMode::Full);
    assert_eq!(restored.presets(), [0, 0, 7_500]);
    assert!(restored.parking_enabled());
    assert_eq!(restored.settings(), settings);
}

#[test]
fn test_execute_commands() {
    let (mut focuser, handle, _sink) = setup();

    focuser
        .execute(FocuserCommand::SetPreset { slot: 0, position: 1_500 })
        .unwrap();
    let outcome = focuser.execute(FocuserCommand::GotoPreset(0)).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Motion(PositionStatus::Moved { from: 0, to: 1_500 })
    );

    let outcome = focuser
        .execute(FocuserCommand::Nudge(FocusDirection::Inward))
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Motion(PositionStatus::Moved { from: 1_500, to: 1_400 }));
    assert_eq!(handle.write_count(), 4);
}
