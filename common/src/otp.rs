use crate::constants::OTP_LENGTH;
use crate::errors::RiderError;
use std::fmt;

/// Delivery confirmation code typed in by the rider.
///
/// Only constructible through [`ConfirmationCode::parse`], so holding one
/// means the local format check already passed. Never stored; `Debug` and
/// `Display` mask the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub fn parse(input: &str) -> Result<Self, RiderError> {
        let code = input.trim();
        if code.len() != OTP_LENGTH {
            return Err(RiderError::Validation(format!(
                "confirmation code must be {} digits, got {}",
                OTP_LENGTH,
                code.chars().count()
            )));
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(RiderError::Validation(
                "confirmation code must contain digits only".to_string(),
            ));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfirmationCode(****)")
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "*".repeat(self.0.len()))
    }
}
