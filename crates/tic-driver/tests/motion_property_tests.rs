//! 位置控制属性测试
//!
//! 使用 proptest 验证行程内/外目标、相对移动和写入失败时的位置不变式。

use proptest::prelude::*;
use tic_driver::{FocusDirection, Focuser, MotionError, PositionStatus, TicFocuser};
use tic_protocol::{MAX_STEPS, TicCommand};
use tic_serial::{MockHandle, MockTransport};

fn connected_at(position: u32) -> (TicFocuser<MockTransport>, MockHandle) {
    let (link, handle) = MockTransport::with_handle();
    let mut focuser: TicFocuser<MockTransport> = TicFocuser::new();
    focuser.sync(position).unwrap();
    focuser.connect(link);
    handle.clear();
    (focuser, handle)
}

proptest! {
    /// 行程内目标总能到达
    #[test]
    fn prop_in_range_target_is_reached(start in 0u32..=MAX_STEPS, target in 0u32..=MAX_STEPS) {
        let (mut focuser, handle) = connected_at(start);

        let status = focuser.move_absolute(target).unwrap();
        prop_assert_eq!(focuser.position(), target);

        if start == target {
            prop_assert_eq!(status, PositionStatus::AlreadyAtTarget { position: target });
            prop_assert_eq!(handle.write_count(), 0);
        } else {
            prop_assert_eq!(status, PositionStatus::Moved { from: start, to: target });
            let frames = handle.frames();
            prop_assert_eq!(frames.len(), 2);
            prop_assert_eq!(frames[0], TicCommand::ExitSafeStart.to_frame());
            prop_assert_eq!(frames[1], TicCommand::SetTargetPosition(target).to_frame());
        }
    }

    /// 行程外目标被拒绝，位置不变
    #[test]
    fn prop_out_of_range_target_rejected(start in 0u32..=MAX_STEPS, target in (MAX_STEPS + 1)..=u32::MAX) {
        let (mut focuser, handle) = connected_at(start);

        let err = focuser.move_absolute(target).unwrap_err();
        let is_out_of_range = matches!(err, MotionError::OutOfRange { .. });
        prop_assert!(is_out_of_range);
        prop_assert_eq!(focuser.position(), start);
        prop_assert_eq!(handle.write_count(), 0);
    }

    /// 相对移动等价于在 i64 上计算后的绝对移动
    #[test]
    fn prop_relative_move_matches_signed_arithmetic(
        start in 0u32..=MAX_STEPS,
        ticks in 0u32..=2 * MAX_STEPS,
        outward in any::<bool>(),
    ) {
        let (mut focuser, _handle) = connected_at(start);
        let direction = if outward { FocusDirection::Outward } else { FocusDirection::Inward };
        let expected = i64::from(start) + direction.sign() * i64::from(ticks);

        let result = focuser.move_relative(direction, ticks);
        if (0..=i64::from(MAX_STEPS)).contains(&expected) {
            prop_assert_eq!(result.unwrap().position() as i64, expected);
            prop_assert_eq!(focuser.position() as i64, expected);
        } else {
            let is_out_of_range = matches!(result, Err(MotionError::OutOfRange { .. }));
            prop_assert!(is_out_of_range);
            prop_assert_eq!(focuser.position(), start);
        }
    }

    /// 任一写入失败时位置不推进
    #[test]
    fn prop_failed_write_never_commits(
        start in 0u32..MAX_STEPS,
        offset in 1u32..=MAX_STEPS,
        failing_write in 0usize..2,
    ) {
        let target = (start + offset) % (MAX_STEPS + 1);
        prop_assume!(target != start);
        let (mut focuser, handle) = connected_at(start);

        handle.fail_write_after(failing_write);
        let result = focuser.move_absolute(target);
        let is_transport = matches!(result, Err(MotionError::Transport(_)));
        prop_assert!(is_transport);
        prop_assert_eq!(focuser.position(), start);
    }
}
