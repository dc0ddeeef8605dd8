use crate::errors::RiderError;
use crate::otp::ConfirmationCode;
use crate::types::dtos::{LoginResponse, OrderDTO, RiderProfileDTO};
use crate::types::order_status::OrderStatus;
use async_trait::async_trait;

/// Operations the rider client needs from the backend.
///
/// Every call that needs authentication takes the bearer token explicitly.
/// Implementations report an unreachable backend as
/// [`RiderError::Connectivity`] and a failed request as
/// [`RiderError::Server`].
#[async_trait]
pub trait RiderGateway: Send + Sync {
    async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse, RiderError>;

    /// Orders currently assigned to the rider.
    async fn fetch_orders(&self, token: &str) -> Result<Vec<OrderDTO>, RiderError>;

    /// Finished (delivered or cancelled) orders.
    async fn fetch_history(&self, token: &str) -> Result<Vec<OrderDTO>, RiderError>;

    async fn update_status(
        &self,
        token: &str,
        order_id: u64,
        status: &OrderStatus,
    ) -> Result<(), RiderError>;

    async fn verify_code(
        &self,
        token: &str,
        order_id: u64,
        code: &ConfirmationCode,
    ) -> Result<(), RiderError>;

    async fn fetch_profile(&self, token: &str) -> Result<RiderProfileDTO, RiderError>;
}
