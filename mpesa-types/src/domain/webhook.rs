use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The inbound notifications the provider posts back to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookKind {
    StkCallback,
    C2bValidation,
    C2bConfirmation,
    B2cResult,
    B2cTimeout,
    B2bResult,
    B2bTimeout,
    BalanceResult,
    BalanceTimeout,
    ReversalResult,
    ReversalTimeout,
    TransactionResult,
    TransactionTimeout,
}

impl WebhookKind {
    /// Route path below the webhook prefix, e.g. `/b2c/result`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::StkCallback => "/stk/callback",
            Self::C2bValidation => "/c2b/validation",
            Self::C2bConfirmation => "/c2b/confirmation",
            Self::B2cResult => "/b2c/result",
            Self::B2cTimeout => "/b2c/timeout",
            Self::B2bResult => "/b2b/result",
            Self::B2bTimeout => "/b2b/timeout",
            Self::BalanceResult => "/balance/result",
            Self::BalanceTimeout => "/balance/timeout",
            Self::ReversalResult => "/reversal/result",
            Self::ReversalTimeout => "/reversal/timeout",
            Self::TransactionResult => "/transaction/result",
            Self::TransactionTimeout => "/transaction/timeout",
        }
    }

    /// Name the event is republished under, e.g. `mpesa.b2c.result`.
    pub fn event_name(&self) -> String {
        format!("mpesa{}", self.path().replace('/', "."))
    }

    pub fn all() -> &'static [WebhookKind] {
        &[
            Self::StkCallback,
            Self::C2bValidation,
            Self::C2bConfirmation,
            Self::B2cResult,
            Self::B2cTimeout,
            Self::B2bResult,
            Self::B2bTimeout,
            Self::BalanceResult,
            Self::BalanceTimeout,
            Self::ReversalResult,
            Self::ReversalTimeout,
            Self::TransactionResult,
            Self::TransactionTimeout,
        ]
    }
}

impl std::fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// A decoded provider notification, republished as a named event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub kind: WebhookKind,
    pub name: String,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl WebhookEvent {
    pub fn new(kind: WebhookKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: kind.event_name(),
            payload,
            received_at: Utc::now(),
        }
    }
}
