use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    B2cPaymentRequest, CredentialField, MpesaError, MpesaTransport, ServiceKind, TokenCache,
};

use super::{OperationContext, positive, subscriber};

const PAYMENT_PATH: &str = "mpesa/b2c/v1/paymentrequest";

/// Business-to-customer payouts.
pub struct B2cService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> B2cService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    /// Pays `amount` to `phone` from the business shortcode.
    #[instrument(skip(self, remarks, occasion))]
    pub async fn send(
        &self,
        phone: &str,
        amount: u64,
        command_id: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Value, MpesaError> {
        self.pay(ServiceKind::B2c, phone, amount, command_id, remarks, occasion)
            .await
    }

    /// Same payout, drawn on the withdrawal account's credentials and callbacks.
    #[instrument(skip(self, remarks, occasion))]
    pub async fn withdraw(
        &self,
        phone: &str,
        amount: u64,
        command_id: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Value, MpesaError> {
        self.pay(
            ServiceKind::Withdrawal,
            phone,
            amount,
            command_id,
            remarks,
            occasion,
        )
        .await
    }

    async fn pay(
        &self,
        service: ServiceKind,
        phone: &str,
        amount: u64,
        command_id: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Value, MpesaError> {
        let phone = subscriber(phone)?;
        let amount = positive(amount)?;
        let credentials = self.ctx.prepare(service)?;

        let request = B2cPaymentRequest {
            initiator_name: credentials
                .require(CredentialField::InitiatorName)?
                .to_string(),
            security_credential: credentials
                .require(CredentialField::SecurityCredential)?
                .to_string(),
            command_id: command_id.to_string(),
            amount,
            party_a: credentials.require(CredentialField::ShortCode)?.to_string(),
            party_b: phone,
            remarks: remarks.to_string(),
            queue_timeout_url: self.ctx.callback_url(service, "timeout")?,
            result_url: self.ctx.callback_url(service, "result")?,
            occasion: occasion.to_string(),
        };

        self.ctx.dispatch(service, PAYMENT_PATH, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Mpesa;
    use crate::security::basic_credential;
    use crate::test_support::{MapCache, MockTransport, sample_config, shared};
    use mpesa_types::{ConfigError, MpesaConfig};

    fn sdk(config: MpesaConfig) -> (Mpesa<MockTransport, MapCache>, Arc<MockTransport>) {
        let (config, transport, cache) = shared(config);
        (Mpesa::from_shared(config, transport.clone(), cache), transport)
    }

    #[tokio::test]
    async fn test_send_uses_business_operations_profile() {
        let (mpesa, transport) = sdk(sample_config());

        mpesa
            .send_money("0712345678", 500, "BusinessPayment", "Refund", "")
            .await
            .unwrap();

        let post = transport.last_post();
        assert_eq!(post.path, "mpesa/b2c/v1/paymentrequest");
        assert_eq!(post.payload["InitiatorName"], "biz-op");
        assert_eq!(post.payload["SecurityCredential"], "biz-cred");
        assert_eq!(post.payload["PartyA"], "174379");
        assert_eq!(post.payload["PartyB"], "254712345678");
        assert_eq!(post.payload["CommandID"], "BusinessPayment");
        assert_eq!(
            post.payload["QueueTimeOutURL"],
            "https://callbacks.example.com/mpesa/timeout"
        );
        assert_eq!(
            post.payload["ResultURL"],
            "https://callbacks.example.com/mpesa/result"
        );
    }

    #[tokio::test]
    async fn test_withdraw_uses_withdrawal_credentials() {
        let mut config = sample_config();
        config.callbacks.per_service.insert(
            ServiceKind::Withdrawal,
            "https://callbacks.example.com/withdrawals".into(),
        );
        let (mpesa, transport) = sdk(config);

        mpesa
            .b2c()
            .withdraw("0712345678", 700, "BusinessPayment", "Payout", "")
            .await
            .unwrap();

        let post = transport.last_post();
        assert_eq!(
            post.token,
            format!("token:{}", basic_credential("w-key", "w-secret"))
        );
        assert_eq!(post.payload["InitiatorName"], "w-op");
        assert_eq!(post.payload["PartyA"], "300300");
        assert_eq!(
            post.payload["ResultURL"],
            "https://callbacks.example.com/withdrawals/result"
        );
    }

    #[tokio::test]
    async fn test_missing_initiator_is_reported_before_io() {
        let mut config = sample_config();
        config
            .profiles
            .get_mut("business_operations")
            .unwrap()
            .fields
            .remove("initiator");
        let (mpesa, transport) = sdk(config);

        let err = mpesa
            .send_money("0712345678", 500, "BusinessPayment", "r", "")
            .await
            .unwrap_err();
        match err {
            MpesaError::Config(ConfigError::Incomplete { service, errors }) => {
                assert_eq!(service, ServiceKind::B2c);
                assert_eq!(
                    errors,
                    vec![ConfigError::MissingField(CredentialField::InitiatorName)]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(transport.token_requests().is_empty());
    }
}
