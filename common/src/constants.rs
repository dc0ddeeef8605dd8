use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.riderapp.in/api";
pub const DEFAULT_PLATFORM: &str = "cli";
pub const DEFAULT_STORE_PATH: &str = "rider_store.json";

pub const PLATFORM_HEADER: &str = "X-Platform";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Length of the delivery confirmation code handed over by the customer.
pub const OTP_LENGTH: usize = 4;

pub const TOKEN_KEY: &str = "auth_token";
pub const PROFILE_KEY: &str = "rider_profile";

pub const TIMEOUT_SECONDS: u64 = 15;
pub const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);
