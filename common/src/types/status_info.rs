use crate::types::order_status::OrderStatus;
use serde::{Deserialize, Serialize};

/// Theme color a status badge is drawn with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Info,
    Warning,
    Primary,
    Success,
    Danger,
    Muted,
}

/// Rider-facing view of an order status. Derived on every render, never stored.
///
/// `next_status` is `None` exactly when the status is terminal or unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub label: String,
    pub color_token: ColorToken,
    pub action_label: String,
    pub next_status: Option<OrderStatus>,
}

impl StatusInfo {
    pub fn has_action(&self) -> bool {
        self.next_status.is_some()
    }
}
