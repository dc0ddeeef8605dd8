use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_PLATFORM, PLATFORM_HEADER, REQUEST_ID_HEADER, TIMEOUT_SECONDS,
};
use crate::errors::RiderError;
use crate::logger::Logger;
use crate::network::gateway::RiderGateway;
use crate::network::reachability::{Reachability, TcpProbe};
use crate::otp::ConfirmationCode;
use crate::types::dtos::{
    ApiEnvelope, LoginRequest, LoginResponse, OrderDTO, RiderProfileDTO, StatusUpdateRequest,
    VerifyCodeRequest,
};
use crate::types::order_status::OrderStatus;
use async_trait::async_trait;
use colored::Color;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Where and how the gateway talks to the backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub platform: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
        }
    }
}

/// [`RiderGateway`] over HTTPS + JSON.
///
/// Before each request the API host is probed; when it is unreachable the
/// request is not issued and [`RiderError::Connectivity`] is returned.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    platform: String,
    reachability: Arc<dyn Reachability>,
    logger: Logger,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig, logger: Logger) -> Result<Self, RiderError> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| RiderError::Validation(format!("invalid API url: {}", e)))?;
        let probe = TcpProbe::for_url(&url)?;
        Self::with_reachability(config, Arc::new(probe), logger)
    }

    pub fn with_reachability(
        config: GatewayConfig,
        reachability: Arc<dyn Reachability>,
        logger: Logger,
    ) -> Result<Self, RiderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RiderError::Validation(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            platform: config.platform,
            reachability,
            logger,
        })
    }

    pub fn default_logger() -> Logger {
        Logger::new("Gateway", Color::Cyan)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Option<T>, RiderError> {
        if !self.reachability.is_reachable().await {
            self.logger
                .warn(format!("API unreachable, not sending {} {}", method, path));
            return Err(RiderError::Connectivity(
                "the API host is unreachable".to_string(),
            ));
        }

        let request_id = Uuid::new_v4().to_string();
        self.logger
            .debug(format!("{} {} [{}]", method, path, request_id));

        let mut builder = self
            .client
            .request(method.clone(), self.endpoint(path))
            .header(PLATFORM_HEADER, &self.platform)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            self.logger.warn(format!(
                "{} {} [{}] failed with {}: {}",
                method, path, request_id, status, message
            ));
            return Err(RiderError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = parse_envelope(&text)?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request failed".to_string());
            self.logger.warn(format!(
                "{} {} [{}] rejected: {}",
                method, path, request_id, message
            ));
            return Err(RiderError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(envelope.data)
    }
}

/// Accepts both `{success, message, data}` envelopes and bare payloads.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<ApiEnvelope<T>, RiderError> {
    if text.trim().is_empty() {
        return Ok(ApiEnvelope {
            success: true,
            message: None,
            data: None,
        });
    }
    let value: Value = serde_json::from_str(text)?;
    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("success") || obj.contains_key("data"));
    if is_envelope {
        return Ok(serde_json::from_value(value)?);
    }
    Ok(ApiEnvelope {
        success: true,
        message: None,
        data: Some(serde_json::from_value(value)?),
    })
}

fn error_message(status: StatusCode, text: &str) -> String {
    let from_body = serde_json::from_str::<Value>(text).ok().and_then(|value| {
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    match from_body {
        Some(message) => message,
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

fn require<T>(data: Option<T>, what: &str) -> Result<T, RiderError> {
    data.ok_or_else(|| RiderError::Serialization(format!("response carried no {}", what)))
}

#[async_trait]
impl RiderGateway for HttpGateway {
    async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse, RiderError> {
        let body = serde_json::to_value(LoginRequest {
            phone: phone.to_string(),
            password: password.to_string(),
        })?;
        let data = self
            .request(Method::POST, "rider/login", None, Some(body))
            .await?;
        require(data, "login data")
    }

    async fn fetch_orders(&self, token: &str) -> Result<Vec<OrderDTO>, RiderError> {
        let orders: Option<Vec<OrderDTO>> = self
            .request(Method::GET, "rider/orders", Some(token), None)
            .await?;
        Ok(orders.unwrap_or_default())
    }

    async fn fetch_history(&self, token: &str) -> Result<Vec<OrderDTO>, RiderError> {
        let orders: Option<Vec<OrderDTO>> = self
            .request(Method::GET, "rider/orders/history", Some(token), None)
            .await?;
        Ok(orders.unwrap_or_default())
    }

    async fn update_status(
        &self,
        token: &str,
        order_id: u64,
        status: &OrderStatus,
    ) -> Result<(), RiderError> {
        let body = serde_json::to_value(StatusUpdateRequest {
            status: status.clone(),
        })?;
        let _: Option<Value> = self
            .request(
                Method::PUT,
                &format!("rider/orders/{}/status", order_id),
                Some(token),
                Some(body),
            )
            .await?;
        self.logger
            .info(format!("Order {} moved to {}", order_id, status));
        Ok(())
    }

    async fn verify_code(
        &self,
        token: &str,
        order_id: u64,
        code: &ConfirmationCode,
    ) -> Result<(), RiderError> {
        let body = serde_json::to_value(VerifyCodeRequest {
            otp: code.as_str().to_string(),
        })?;
        let _: Option<Value> = self
            .request(
                Method::POST,
                &format!("rider/orders/{}/verify-otp", order_id),
                Some(token),
                Some(body),
            )
            .await?;
        self.logger
            .info(format!("Delivery code accepted for order {}", order_id));
        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<RiderProfileDTO, RiderError> {
        let data = self
            .request(Method::GET, "rider/profile", Some(token), None)
            .await?;
        require(data, "profile")
    }
}
