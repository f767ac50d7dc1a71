use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    B2bPayment, B2bPaymentRequest, CredentialField, MpesaError, MpesaTransport, ServiceKind,
    TokenCache,
};

use super::{OperationContext, positive};

const PAYMENT_PATH: &str = "mpesa/b2b/v1/paymentrequest";

/// Business-to-business transfers.
pub struct B2bService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> B2bService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self), fields(receiver = %payment.receiver_shortcode, amount = payment.amount))]
    pub async fn send(&self, payment: B2bPayment) -> Result<Value, MpesaError> {
        let amount = positive(payment.amount)?;
        if payment.receiver_shortcode.trim().is_empty() {
            return Err(MpesaError::InvalidInput(
                "Receiver shortcode is required".into(),
            ));
        }
        let credentials = self.ctx.prepare(ServiceKind::B2b)?;

        let request = B2bPaymentRequest {
            initiator: credentials
                .require(CredentialField::InitiatorName)?
                .to_string(),
            security_credential: credentials
                .require(CredentialField::SecurityCredential)?
                .to_string(),
            command_id: payment.command_id,
            sender_identifier_type: payment.sender_identifier_type,
            receiver_identifier_type: payment.receiver_identifier_type,
            amount,
            party_a: credentials.require(CredentialField::ShortCode)?.to_string(),
            party_b: payment.receiver_shortcode,
            account_reference: payment.account_reference,
            remarks: payment.remarks,
            queue_timeout_url: self.ctx.callback_url(ServiceKind::B2b, "timeout")?,
            result_url: self.ctx.callback_url(ServiceKind::B2b, "result")?,
            occasion: payment.occasion,
        };

        self.ctx
            .dispatch(ServiceKind::B2b, PAYMENT_PATH, &request)
            .await
    }
}
