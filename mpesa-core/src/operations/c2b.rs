use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, warn};

use mpesa_types::{
    C2bRegisterRequest, C2bSimulateRequest, CredentialField, Environment, MpesaError,
    MpesaTransport, ServiceKind, TokenCache,
};

use super::{OperationContext, positive, subscriber};

const REGISTER_PATH: &str = "mpesa/c2b/v1/registerurl";
const SIMULATE_PATH: &str = "mpesa/c2b/v1/simulate";

/// Paybill command used when none is given.
pub const DEFAULT_COMMAND: &str = "CustomerPayBillOnline";

/// Merchant collection: URL registration and sandbox simulation.
pub struct C2bService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> C2bService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    /// Registers the confirmation and validation URLs for the shortcode.
    #[instrument(skip(self))]
    pub async fn register_urls(
        &self,
        confirmation_url: &str,
        validation_url: &str,
        response_type: &str,
    ) -> Result<Value, MpesaError> {
        let credentials = self.ctx.prepare(ServiceKind::C2b)?;

        let request = C2bRegisterRequest {
            short_code: credentials.require(CredentialField::ShortCode)?.to_string(),
            response_type: response_type.to_string(),
            confirmation_url: confirmation_url.to_string(),
            validation_url: validation_url.to_string(),
        };

        self.ctx
            .dispatch(ServiceKind::C2b, REGISTER_PATH, &request)
            .await
    }

    /// Simulates a customer payment. Only the sandbox accepts it.
    #[instrument(skip(self))]
    pub async fn simulate(
        &self,
        phone: &str,
        amount: u64,
        reference: &str,
        command_id: &str,
    ) -> Result<Value, MpesaError> {
        if self.ctx.config().environment != Environment::Sandbox {
            warn!("Refusing to simulate a payment outside the sandbox");
            return Err(MpesaError::SandboxOnly);
        }
        let phone = subscriber(phone)?;
        let amount = positive(amount)?;
        let credentials = self.ctx.prepare(ServiceKind::C2b)?;

        let request = C2bSimulateRequest {
            short_code: credentials.require(CredentialField::ShortCode)?.to_string(),
            command_id: command_id.to_string(),
            amount,
            msisdn: phone,
            bill_ref_number: reference.to_string(),
        };

        self.ctx
            .dispatch(ServiceKind::C2b, SIMULATE_PATH, &request)
            .await
    }
}
