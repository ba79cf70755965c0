//! # Order Flow
//!
//! Which order status changes an administrator may make.
//!
//! ```text
//!   pending ──► confirmed ──► shipped ──► delivered
//!      │            │
//!      └────────────┴──► cancelled (stock goes back on the shelf)
//! ```
//!
//! `delivered` and `cancelled` are terminal.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

impl OrderStatus {
    /// Whether an order in this status may move to `next`.
    ///
    /// Setting the same status again is not a transition and is rejected.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// True when moving to `next` returns the order's items to stock.
    pub fn restocks_on(&self, next: OrderStatus) -> bool {
        next == OrderStatus::Cancelled && self.can_transition_to(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Checks a status change, returning `InvalidStatusTransition` when illegal.
pub fn transition(from: OrderStatus, to: OrderStatus) -> CoreResult<OrderStatus> {
    if !from.can_transition_to(to) {
        return Err(CoreError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_forward_path() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancellation_window() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_go_nowhere() {
        for next in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Delivered.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn test_same_status_rejected() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Confirmed));
    }

    #[test]
    fn test_restocks_only_on_cancel() {
        assert!(Pending.restocks_on(Cancelled));
        assert!(Confirmed.restocks_on(Cancelled));
        assert!(!Pending.restocks_on(Confirmed));
        assert!(!Cancelled.restocks_on(Cancelled));
    }

    #[test]
    fn test_transition_error_message() {
        assert_eq!(transition(Pending, Confirmed).unwrap(), Confirmed);

        let err = transition(Delivered, Pending).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot change order status from delivered to pending"
        );
    }
}
