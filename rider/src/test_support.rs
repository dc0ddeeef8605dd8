//! In-memory backend used by the actor and auth tests.

use async_trait::async_trait;
use common::errors::RiderError;
use common::network::RiderGateway;
use common::otp::ConfirmationCode;
use common::session::Session;
use common::types::dtos::{LoginResponse, OrderDTO, RiderProfileDTO};
use common::types::order_status::OrderStatus;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    FetchOrders,
    FetchHistory,
    UpdateStatus(u64, OrderStatus),
    VerifyCode(u64, String),
    FetchProfile,
}

/// Records every call and behaves like a well-mannered server: status
/// updates and accepted codes are applied to its own order list.
pub struct RecordingGateway {
    pub calls: Mutex<Vec<Call>>,
    pub orders: Mutex<Vec<OrderDTO>>,
    pub history: Vec<OrderDTO>,
    pub profile: RiderProfileDTO,
    /// Codes other than this one are rejected with `success: false`.
    pub valid_code: String,
    /// Error to answer status updates with, instead of applying them.
    pub update_failure: Option<(u16, String)>,
    /// Mutations fail as if the network were down.
    pub offline: bool,
    pub latency: Duration,
}

impl RecordingGateway {
    pub fn with_orders(orders: Vec<OrderDTO>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            orders: Mutex::new(orders),
            history: Vec::new(),
            profile: RiderProfileDTO {
                name: "Asha".to_string(),
                phone: "9800000000".to_string(),
                ..Default::default()
            },
            valid_code: "4821".to_string(),
            update_failure: None,
            offline: false,
            latency: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| wanted(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn set_status(&self, order_id: u64, status: &OrderStatus) {
        for order in self.orders.lock().unwrap().iter_mut() {
            if order.id == order_id {
                order.status = status.as_str().to_string();
            }
        }
    }

    async fn wait(&self) -> Result<(), RiderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline {
            return Err(RiderError::Connectivity("network is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RiderGateway for RecordingGateway {
    async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse, RiderError> {
        self.record(Call::Login(phone.to_string()));
        if password != "secret" {
            return Err(RiderError::Server {
                status: 401,
                message: "Invalid credentials".to_string(),
            });
        }
        Ok(LoginResponse {
            token: "tok-1".to_string(),
            rider: self.profile.clone(),
        })
    }

    async fn fetch_orders(&self, _token: &str) -> Result<Vec<OrderDTO>, RiderError> {
        self.record(Call::FetchOrders);
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn fetch_history(&self, _token: &str) -> Result<Vec<OrderDTO>, RiderError> {
        self.record(Call::FetchHistory);
        Ok(self.history.clone())
    }

    async fn update_status(
        &self,
        _token: &str,
        order_id: u64,
        status: &OrderStatus,
    ) -> Result<(), RiderError> {
        self.record(Call::UpdateStatus(order_id, status.clone()));
        self.wait().await?;
        if let Some((status, message)) = &self.update_failure {
            return Err(RiderError::Server {
                status: *status,
                message: message.clone(),
            });
        }
        self.set_status(order_id, status);
        Ok(())
    }

    async fn verify_code(
        &self,
        _token: &str,
        order_id: u64,
        code: &ConfirmationCode,
    ) -> Result<(), RiderError> {
        self.record(Call::VerifyCode(order_id, code.as_str().to_string()));
        self.wait().await?;
        if code.as_str() != self.valid_code {
            return Err(RiderError::Server {
                status: 200,
                message: "Invalid OTP".to_string(),
            });
        }
        self.set_status(order_id, &OrderStatus::Delivered);
        Ok(())
    }

    async fn fetch_profile(&self, _token: &str) -> Result<RiderProfileDTO, RiderError> {
        self.record(Call::FetchProfile);
        Ok(self.profile.clone())
    }
}

pub fn order(id: u64, status: &str) -> OrderDTO {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": status,
        "orderCode": format!("ORD-{}", id),
        "totalAmount": 100.0,
        "itemCount": 1,
    }))
    .unwrap()
}

pub fn session() -> Session {
    Session {
        token: "tok-1".to_string(),
        profile: RiderProfileDTO {
            name: "Asha".to_string(),
            phone: "9800000000".to_string(),
            ..Default::default()
        },
    }
}
