//! Service identity.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the fixed payment-operation kinds.
///
/// Each kind can be bound to a credential profile, may have a legacy
/// credential entry, and may carry its own callback URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Push payment (STK push / Lipa na M-Pesa online).
    #[serde(rename = "stk")]
    Stk,
    /// Merchant collection (C2B URL registration and simulation).
    #[serde(rename = "c2b")]
    C2b,
    /// Business to customer.
    #[serde(rename = "b2c")]
    B2c,
    /// Business to business.
    #[serde(rename = "b2b")]
    B2b,
    #[serde(rename = "balance")]
    Balance,
    #[serde(rename = "reversal")]
    Reversal,
    #[serde(rename = "transaction_status")]
    TransactionStatus,
    /// B2C payouts drawn from a dedicated withdrawal shortcode.
    #[serde(rename = "withdrawal")]
    Withdrawal,
}

impl ServiceKind {
    /// Configuration key for this service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stk => "stk",
            Self::C2b => "c2b",
            Self::B2c => "b2c",
            Self::B2b => "b2b",
            Self::Balance => "balance",
            Self::Reversal => "reversal",
            Self::TransactionStatus => "transaction_status",
            Self::Withdrawal => "withdrawal",
        }
    }

    /// Every service kind, in declaration order.
    pub fn all() -> &'static [ServiceKind] {
        &[
            Self::Stk,
            Self::C2b,
            Self::B2c,
            Self::B2b,
            Self::Balance,
            Self::Reversal,
            Self::TransactionStatus,
            Self::Withdrawal,
        ]
    }
}

impl AsRef<str> for ServiceKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "stk" | "push-payment" => Ok(Self::Stk),
            "c2b" | "merchant-collection" => Ok(Self::C2b),
            "b2c" | "business-to-customer" => Ok(Self::B2c),
            "b2b" | "business-to-business" => Ok(Self::B2b),
            "balance" => Ok(Self::Balance),
            "reversal" => Ok(Self::Reversal),
            "transaction-status" => Ok(Self::TransactionStatus),
            "withdrawal" => Ok(Self::Withdrawal),
            _ => Err(ConfigError::UnknownService(s.to_string())),
        }
    }
}
