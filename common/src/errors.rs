//! Error taxonomy of the rider client.
//!
//! Every variant ends up as an alert in the UI; none of them is fatal.

use crate::types::order_status::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiderError {
    /// The API host could not be reached, or the transport gave up.
    #[error("No internet connection: {0}")]
    Connectivity(String),
    /// Input rejected locally before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The order cannot move from `from` to `to`.
    #[error("Order cannot move from {from} to {to}")]
    TransitionDenied { from: OrderStatus, to: OrderStatus },
    /// The server answered, but reported a failure.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// A status update or code verification is already in flight for the order.
    #[error("Order {0} is already being updated")]
    Busy(u64),
    /// `delivering → delivered` only goes through the confirmation code check.
    #[error("Order {0} needs the customer's confirmation code")]
    CodeRequired(u64),
    #[error("Order {0} is not in the current list")]
    UnknownOrder(u64),
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RiderError {
    /// Whether the order list should be refetched after this error to pick up
    /// the true server state.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, RiderError::Server { .. })
    }
}

impl From<reqwest::Error> for RiderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            RiderError::Connectivity(err.to_string())
        } else if err.is_decode() || err.is_body() {
            RiderError::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            RiderError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() || err.is_redirect() {
            RiderError::Validation(err.to_string())
        } else {
            RiderError::Connectivity(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RiderError {
    fn from(err: serde_json::Error) -> Self {
        RiderError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RiderError {
    fn from(err: std::io::Error) -> Self {
        RiderError::Storage(err.to_string())
    }
}
