//! Order status state machine.
//!
//! Single source of truth for what a rider can do with an order:
//!
//! ```text
//! assigned ──► picked ──► delivering ──► delivered
//!     │           │            │
//!     └───────────┴────────────┴──────► cancelled
//! ```
//!
//! `delivering ──► delivered` is the only edge gated by the customer's
//! confirmation code. Every function here is pure and total.

use crate::errors::RiderError;
use crate::types::dtos::OrderDTO;
use crate::types::order_status::OrderStatus;
use crate::types::status_info::{ColorToken, StatusInfo};

/// What the UI should do when the rider taps the action button of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderAction {
    /// Ask for a yes/no confirmation, then send `updateStatus(to)`.
    Advance { to: OrderStatus },
    /// Ask for the customer's code, then send `verifyCode`.
    RequestCode,
    /// Nothing to do, the order was already delivered.
    AlreadyCompleted,
    /// Nothing to do, the order was cancelled.
    AlreadyCancelled,
    /// Status not understood by this client; the order can only be viewed.
    ViewOnly,
}

/// Label, badge color, action label and next status for a raw status string.
pub fn describe(raw: &str) -> StatusInfo {
    describe_status(&OrderStatus::from_raw(raw))
}

pub fn describe_status(status: &OrderStatus) -> StatusInfo {
    let (label, color_token, action_label) = match status {
        OrderStatus::Assigned => ("Assigned", ColorToken::Info, "Mark as Picked"),
        OrderStatus::Picked => ("Picked Up", ColorToken::Warning, "Start Delivery"),
        OrderStatus::Delivering => (
            "Out for Delivery",
            ColorToken::Primary,
            "Complete Delivery",
        ),
        OrderStatus::Delivered => ("Delivered", ColorToken::Success, "Completed"),
        OrderStatus::Cancelled => ("Cancelled", ColorToken::Danger, "Cancelled"),
        OrderStatus::Unknown(raw) => {
            let label = if raw.is_empty() { "Unknown" } else { raw.as_str() };
            return StatusInfo {
                label: label.to_string(),
                color_token: ColorToken::Muted,
                action_label: "View".to_string(),
                next_status: None,
            };
        }
    };
    StatusInfo {
        label: label.to_string(),
        color_token,
        action_label: action_label.to_string(),
        next_status: next_transition(status),
    }
}

/// The single forward edge out of `status`, if any.
pub fn next_transition(status: &OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::Assigned => Some(OrderStatus::Picked),
        OrderStatus::Picked => Some(OrderStatus::Delivering),
        OrderStatus::Delivering => Some(OrderStatus::Delivered),
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Unknown(_) => None,
    }
}

/// Whether moving into `target` needs the customer's confirmation code.
pub fn requires_confirmation(target: &OrderStatus) -> bool {
    *target == OrderStatus::Delivered
}

/// Cancellation is open from every non-terminal status, unknown included.
pub fn can_cancel(status: &OrderStatus) -> bool {
    !status.is_terminal()
}

/// Admits `from → to` when `to` is the forward edge or a cancellation.
///
/// # Returns
/// - `Ok(to)` if the transition is legal.
/// - `Err(RiderError::TransitionDenied)` otherwise; the caller must not reach
///   the gateway.
pub fn check_transition(from: &OrderStatus, to: &OrderStatus) -> Result<OrderStatus, RiderError> {
    let forward = next_transition(from).is_some_and(|next| next == *to);
    let cancel = *to == OrderStatus::Cancelled && can_cancel(from);
    if forward || cancel {
        Ok(to.clone())
    } else {
        Err(RiderError::TransitionDenied {
            from: from.clone(),
            to: to.clone(),
        })
    }
}

pub fn plan_action(order: &OrderDTO) -> OrderAction {
    let status = order.status();
    match next_transition(&status) {
        Some(next) if requires_confirmation(&next) => OrderAction::RequestCode,
        Some(next) => OrderAction::Advance { to: next },
        None => match status {
            OrderStatus::Delivered => OrderAction::AlreadyCompleted,
            OrderStatus::Cancelled => OrderAction::AlreadyCancelled,
            _ => OrderAction::ViewOnly,
        },
    }
}
