use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical lifecycle status of an order, as seen by the rider.
///
/// The server sends free-form strings; [`OrderStatus::from_raw`] folds case,
/// separators and the legacy aliases into one of these variants. Anything it
/// does not recognize is kept verbatim in [`OrderStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Assigned,   // Assigned to the rider, not yet collected (alias: pending)
    Picked,     // Collected from the store (alias: picked_up)
    Delivering, // On the way to the customer (alias: out_for_delivery)
    Delivered,
    Cancelled,
    Unknown(String),
}

impl OrderStatus {
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        let normalized = trimmed.to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "assigned" | "pending" => OrderStatus::Assigned,
            "picked" | "picked_up" => OrderStatus::Picked,
            "delivering" | "out_for_delivery" => OrderStatus::Delivering,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown(trimmed.to_string()),
        }
    }

    /// Wire name sent back to the server. Unknown statuses echo their raw text.
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Assigned => "assigned",
            OrderStatus::Picked => "picked",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Unknown(_))
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        OrderStatus::from_raw(&raw)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
