//! Payment Records

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result reported by the (mock) payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    #[default]
    Success,
    Failure,
    Canceled,
}

impl PaymentOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown payment outcome `{0}`")]
pub struct UnknownPaymentOutcome(pub String);

impl FromStr for PaymentOutcome {
    type Err = UnknownPaymentOutcome;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "canceled" => Ok(Self::Canceled),
            other => Err(UnknownPaymentOutcome(other.to_string())),
        }
    }
}
