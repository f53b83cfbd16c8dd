//! 预订状态机
//!
//! 状态转移规则集中在此处；存储层只负责落盘已经过校验的转移。
//!
//! ```text
//! PENDING ──► CONFIRMED ──► COMPLETED
//!    │           │  └─────► NO_SHOW
//!    └───────────┴────────► CANCELLED
//! ```

use shared::error::{AppError, AppResult};
use shared::models::{Reservation, ReservationStatus};

/// Initial status for a new booking: a table assigned at booking time means
/// staff already committed it, otherwise it waits for allocation.
pub fn initial_status(table_assigned: bool) -> ReservationStatus {
    if table_assigned {
        ReservationStatus::Confirmed
    } else {
        ReservationStatus::Pending
    }
}

/// Whether `from -> to` is a legal lifecycle edge
pub fn can_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
    use ReservationStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
            | (Confirmed, NoShow)
    )
}

/// Apply a lifecycle edge, leaving the reservation untouched on a rejected
/// transition
pub fn transition(reservation: &mut Reservation, target: ReservationStatus) -> AppResult<()> {
    if !can_transition(reservation.status, target) {
        return Err(AppError::invalid_transition(
            reservation.status.as_str(),
            target.as_str(),
        ));
    }
    reservation.status = target;
    Ok(())
}

/// 超时自动取消判定
///
/// CONFIRMED 预订在 `start_at + grace` 过后仍未到店，桌台释放回流转。
/// `end_at` 不延长保留时间: 未到店就是未到店。
pub fn should_auto_cancel(reservation: &Reservation, now_millis: i64, grace_millis: i64) -> bool {
    reservation.status == ReservationStatus::Confirmed
        && now_millis > reservation.start_at + grace_millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CustomerRef;

    const GRACE: i64 = 3_600_000;

    fn create_test_reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: 1,
            customer: CustomerRef::Registered { customer_id: 7 },
            table_id: Some(3),
            start_at: 10_000_000,
            end_at: None,
            party_size: 2,
            status,
            notes: None,
            requested_at: 9_000_000,
        }
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(initial_status(true), ReservationStatus::Confirmed);
        assert_eq!(initial_status(false), ReservationStatus::Pending);
    }

    #[test]
    fn test_legal_edges() {
        use ReservationStatus::*;
        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, Completed));
        assert!(can_transition(Confirmed, Cancelled));
        assert!(can_transition(Confirmed, NoShow));
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        use ReservationStatus::*;
        let all = [Pending, Confirmed, Cancelled, Completed, NoShow];
        for from in [Cancelled, Completed, NoShow] {
            for to in all {
                assert!(!can_transition(from, to), "{} -> {} must be illegal", from, to);
            }
        }
    }

    #[test]
    fn test_illegal_edges_rejected() {
        use ReservationStatus::*;
        // Pending cannot skip straight to Completed or NoShow
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Pending, NoShow));
        // No edge back into Pending or Confirmed
        assert!(!can_transition(Confirmed, Pending));
        assert!(!can_transition(Completed, Confirmed));
        // Self loops are not edges
        assert!(!can_transition(Confirmed, Confirmed));
        assert!(!can_transition(Cancelled, Cancelled));
    }

    #[test]
    fn test_transition_mutates_only_on_legal_edge() {
        let mut res = create_test_reservation(ReservationStatus::Pending);
        transition(&mut res, ReservationStatus::Confirmed).unwrap();
        assert_eq!(res.status, ReservationStatus::Confirmed);

        let err = transition(&mut res, ReservationStatus::Pending).unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::InvalidTransition);
        // State untouched after the rejected edge
        assert_eq!(res.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_should_auto_cancel_after_grace() {
        let res = create_test_reservation(ReservationStatus::Confirmed);
        let deadline = res.start_at + GRACE;
        assert!(!should_auto_cancel(&res, res.start_at, GRACE));
        assert!(!should_auto_cancel(&res, deadline, GRACE));
        assert!(should_auto_cancel(&res, deadline + 1, GRACE));
    }

    #[test]
    fn test_only_confirmed_auto_cancels() {
        use ReservationStatus::*;
        let late = 100_000_000;
        for status in [Pending, Cancelled, Completed, NoShow] {
            let res = create_test_reservation(status);
            assert!(!should_auto_cancel(&res, late, GRACE));
        }
    }
}
