//! Data Transfer Objects: provider request payloads and operation inputs.
//!
//! Field names follow the provider's wire format.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Push payment
// ─────────────────────────────────────────────────────────────────────────────

/// STK push request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: String,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// STK push status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkQueryRequest {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Merchant collection
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2bRegisterRequest {
    pub short_code: String,
    pub response_type: String,
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2bSimulateRequest {
    pub short_code: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    pub amount: u64,
    pub msisdn: String,
    pub bill_ref_number: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Business payments
// ─────────────────────────────────────────────────────────────────────────────

/// B2C payment request (also used for withdrawals).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2cPaymentRequest {
    pub initiator_name: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    pub occasion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2bPaymentRequest {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    pub sender_identifier_type: String,
    // Provider spelling.
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: String,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub account_reference: String,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    pub occasion: String,
}

/// Caller input for a B2B payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct B2bPayment {
    pub receiver_shortcode: String,
    pub amount: u64,
    pub command_id: String,
    pub sender_identifier_type: String,
    pub receiver_identifier_type: String,
    pub account_reference: String,
    pub remarks: String,
    pub occasion: String,
}

impl B2bPayment {
    /// A payment between two shortcodes (identifier type `4`).
    pub fn new(
        receiver_shortcode: impl Into<String>,
        amount: u64,
        command_id: impl Into<String>,
        account_reference: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            receiver_shortcode: receiver_shortcode.into(),
            amount,
            command_id: command_id.into(),
            sender_identifier_type: "4".to_string(),
            receiver_identifier_type: "4".to_string(),
            account_reference: account_reference.into(),
            remarks: remarks.into(),
            occasion: String::new(),
        }
    }

    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasion = occasion.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries and reversals
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BalanceQueryRequest {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    pub party_a: String,
    pub identifier_type: String,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReversalRequest {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    pub amount: u64,
    pub receiver_party: String,
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    pub remarks: String,
    pub occasion: String,
}

/// Caller input for a reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    pub transaction_id: String,
    pub amount: u64,
    pub receiver_party: String,
    pub receiver_identifier_type: String,
    pub remarks: String,
    pub occasion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionStatusRequest {
    pub initiator: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: String,
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    pub party_a: String,
    pub identifier_type: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    pub remarks: String,
    pub occasion: String,
}
