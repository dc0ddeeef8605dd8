use crate::types::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, serde_as};

/// One delivery assignment, as returned by the orders endpoints.
///
/// Only `id` and `status` drive client behaviour; the rest is shown to the
/// rider as-is.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDTO {
    /// Server id. Some backends send it as a numeric string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,
    /// Raw status string; see [`OrderDTO::status`]. `null` reads as empty.
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub status: String,
    /// Human readable code printed on the parcel.
    #[serde(default)]
    pub order_code: Option<String>,
    /// Cash to collect. Numeric strings and `null` are accepted.
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    pub total_amount: f64,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    pub item_count: u32,
    #[serde(default)]
    pub address: Option<AddressDTO>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderDTO {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_raw(&self.status)
    }

    /// `order_code` when present, `#<id>` otherwise.
    pub fn display_code(&self) -> String {
        match &self.order_code {
            Some(code) if !code.trim().is_empty() => code.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDTO {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub landmark: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
}

impl AddressDTO {
    /// Non-empty parts joined with `, `.
    pub fn one_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.landmark,
            &self.city,
            &self.pincode,
        ]
        .into_iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Rider profile cached in the persistent store after login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RiderProfileDTO {
    pub id: Option<String>,
    pub name: String,
    pub phone: String,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
    pub rider_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub rider: RiderProfileDTO,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub otp: String,
}

/// Envelope every API response is wrapped in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}
