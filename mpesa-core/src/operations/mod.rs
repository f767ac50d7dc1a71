//! Provider operations.
//!
//! Every operation runs the same pipeline through [`OperationContext`]:
//! pre-flight validation of its service, credential resolution, payload
//! construction, a bearer token for the service, then one POST.

mod b2b;
mod b2c;
mod balance;
mod c2b;
mod reversal;
mod status;
mod stk;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use mpesa_types::{
    B2bPayment, ConfigError, MpesaConfig, MpesaError, MpesaTransport, ResolvedCredentials,
    Reversal, ServiceKind, TokenCache,
};

use crate::credentials::CredentialSelector;
use crate::token::TokenProvider;
use crate::util::{format_phone_number, is_valid_phone_number, mask_sensitive};
use crate::validator::ConfigValidator;

pub use b2b::B2bService;
pub use b2c::B2cService;
pub use balance::{BalanceService, DEFAULT_COMMAND as BALANCE_COMMAND, SHORTCODE_IDENTIFIER};
pub use c2b::{C2bService, DEFAULT_COMMAND as PAYBILL_COMMAND};
pub use reversal::ReversalService;
pub use status::{MSISDN_IDENTIFIER, TransactionStatusService};
pub use stk::StkService;

/// State shared by every operation service.
pub struct OperationContext<T: MpesaTransport, C: TokenCache> {
    config: Arc<MpesaConfig>,
    selector: CredentialSelector,
    validator: ConfigValidator,
    tokens: TokenProvider<T, C>,
    transport: Arc<T>,
}

impl<T: MpesaTransport, C: TokenCache> OperationContext<T, C> {
    pub fn new(config: Arc<MpesaConfig>, transport: Arc<T>, cache: Arc<C>) -> Self {
        let selector = CredentialSelector::new(config.clone());
        Self {
            validator: ConfigValidator::new(selector.clone()),
            tokens: TokenProvider::new(config.clone(), transport.clone(), cache),
            selector,
            config,
            transport,
        }
    }

    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Validates `service` and returns its credentials, or every problem found.
    pub(crate) fn prepare(&self, service: ServiceKind) -> Result<ResolvedCredentials, MpesaError> {
        let (credentials, result) = self.validator.inspect(service)?;
        result.into_result()?;
        Ok(credentials)
    }

    /// `<service or base callback URL>/<endpoint>`.
    pub(crate) fn callback_url(
        &self,
        service: ServiceKind,
        endpoint: &str,
    ) -> Result<String, ConfigError> {
        let base = self
            .config
            .callbacks
            .url_for(service)
            .ok_or(ConfigError::MissingCallbackUrl(service))?
            .trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        if endpoint.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{}/{}", base, endpoint))
        }
    }

    /// Sends `payload` to `path` with a bearer token for `service`.
    pub(crate) async fn dispatch<P: Serialize>(
        &self,
        service: ServiceKind,
        path: &str,
        payload: &P,
    ) -> Result<Value, MpesaError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| MpesaError::InvalidInput(e.to_string()))?;
        let token = self.tokens.get_token(Some(service)).await?;

        if self.config.logging.enabled {
            info!(
                %service,
                path,
                payload = %mask_sensitive(&payload),
                "M-Pesa API request"
            );
        }

        let response = self.transport.post(path, &token, &payload).await?;

        if self.config.logging.enabled {
            debug!(%service, path, response = %response, "M-Pesa API response");
        }
        Ok(response)
    }
}

/// Normalizes and checks a subscriber phone number.
pub(crate) fn subscriber(phone: &str) -> Result<String, MpesaError> {
    if !is_valid_phone_number(phone) {
        return Err(MpesaError::InvalidInput(format!(
            "Invalid phone number: {}",
            phone
        )));
    }
    Ok(format_phone_number(phone))
}

pub(crate) fn positive(amount: u64) -> Result<u64, MpesaError> {
    if amount == 0 {
        return Err(MpesaError::InvalidInput("Amount must be positive".into()));
    }
    Ok(amount)
}

/// Entry point bundling every operation service over one transport and cache.
///
/// Generic over `T: MpesaTransport` and `C: TokenCache` - adapters are
/// injected at compile time.
pub struct Mpesa<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> Mpesa<T, C> {
    /// Creates the SDK from an owned configuration, transport and cache.
    pub fn new(config: MpesaConfig, transport: T, cache: C) -> Self {
        Self::from_shared(Arc::new(config), Arc::new(transport), Arc::new(cache))
    }

    pub fn from_shared(config: Arc<MpesaConfig>, transport: Arc<T>, cache: Arc<C>) -> Self {
        Self {
            ctx: Arc::new(OperationContext::new(config, transport, cache)),
        }
    }

    pub fn config(&self) -> &MpesaConfig {
        self.ctx.config()
    }

    /// Token provider.
    pub fn auth(&self) -> &TokenProvider<T, C> {
        &self.ctx.tokens
    }

    pub fn validator(&self) -> &ConfigValidator {
        &self.ctx.validator
    }

    pub fn credentials(&self) -> &CredentialSelector {
        &self.ctx.selector
    }

    pub fn stk(&self) -> StkService<T, C> {
        StkService::new(self.ctx.clone())
    }

    pub fn c2b(&self) -> C2bService<T, C> {
        C2bService::new(self.ctx.clone())
    }

    pub fn b2c(&self) -> B2cService<T, C> {
        B2cService::new(self.ctx.clone())
    }

    pub fn b2b(&self) -> B2bService<T, C> {
        B2bService::new(self.ctx.clone())
    }

    pub fn balance(&self) -> BalanceService<T, C> {
        BalanceService::new(self.ctx.clone())
    }

    pub fn reversal(&self) -> ReversalService<T, C> {
        ReversalService::new(self.ctx.clone())
    }

    pub fn transaction(&self) -> TransactionStatusService<T, C> {
        TransactionStatusService::new(self.ctx.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Shortcuts
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn stk_push(
        &self,
        phone: &str,
        amount: u64,
        reference: &str,
        description: &str,
    ) -> Result<Value, MpesaError> {
        self.stk()
            .push(phone, amount, reference, description, None)
            .await
    }

    pub async fn stk_query(&self, checkout_request_id: &str) -> Result<Value, MpesaError> {
        self.stk().query(checkout_request_id).await
    }

    pub async fn send_money(
        &self,
        phone: &str,
        amount: u64,
        command_id: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Value, MpesaError> {
        self.b2c()
            .send(phone, amount, command_id, remarks, occasion)
            .await
    }

    pub async fn check_balance(&self, remarks: &str) -> Result<Value, MpesaError> {
        self.balance()
            .query(remarks, BALANCE_COMMAND, SHORTCODE_IDENTIFIER)
            .await
    }

    pub async fn check_transaction_status(
        &self,
        transaction_id: &str,
        party_a: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Value, MpesaError> {
        self.transaction()
            .status(
                transaction_id,
                party_a,
                remarks,
                occasion,
                MSISDN_IDENTIFIER,
            )
            .await
    }

    pub async fn send_b2b(&self, payment: B2bPayment) -> Result<Value, MpesaError> {
        self.b2b().send(payment).await
    }

    pub async fn reverse_transaction(&self, reversal: Reversal) -> Result<Value, MpesaError> {
        self.reversal().reverse(reversal).await
    }
}
