use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    CredentialField, MpesaError, MpesaTransport, ServiceKind, TokenCache,
    TransactionStatusRequest,
};

use super::OperationContext;

const STATUS_PATH: &str = "mpesa/transactionstatus/v1/query";
const COMMAND: &str = "TransactionStatusQuery";

/// Identifier type of a subscriber MSISDN.
pub const MSISDN_IDENTIFIER: &str = "1";

pub struct TransactionStatusService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> TransactionStatusService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    /// Asks for the status of `transaction_id`. The outcome arrives on the
    /// result callback.
    #[instrument(skip(self, remarks, occasion))]
    pub async fn status(
        &self,
        transaction_id: &str,
        party_a: &str,
        remarks: &str,
        occasion: &str,
        identifier_type: &str,
    ) -> Result<Value, MpesaError> {
        if transaction_id.trim().is_empty() {
            return Err(MpesaError::InvalidInput("Transaction ID is required".into()));
        }
        let service = ServiceKind::TransactionStatus;
        let credentials = self.ctx.prepare(service)?;

        let request = TransactionStatusRequest {
            initiator: credentials
                .require(CredentialField::InitiatorName)?
                .to_string(),
            security_credential: credentials
                .require(CredentialField::SecurityCredential)?
                .to_string(),
            command_id: COMMAND.to_string(),
            transaction_id: transaction_id.to_string(),
            party_a: party_a.to_string(),
            identifier_type: identifier_type.to_string(),
            result_url: self.ctx.callback_url(service, "result")?,
            queue_timeout_url: self.ctx.callback_url(service, "timeout")?,
            remarks: remarks.to_string(),
            occasion: occasion.to_string(),
        };

        self.ctx.dispatch(service, STATUS_PATH, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Mpesa;
    use crate::security::basic_credential;
    use crate::test_support::{MapCache, MockTransport, fields, sample_config, shared};
    use mpesa_types::{ConfigError, MpesaConfig};

    fn sdk(config: MpesaConfig) -> (Mpesa<MockTransport, MapCache>, Arc<MockTransport>) {
        let (config, transport, cache) = shared(config);
        (Mpesa::from_shared(config, transport.clone(), cache), transport)
    }

    #[tokio::test]
    async fn test_unbound_service_uses_global_defaults() {
        let (mpesa, transport) = sdk(sample_config());

        mpesa
            .check_transaction_status("OEI2AK4Q16", "254712345678", "Check", "")
            .await
            .unwrap();

        let post = transport.last_post();
        assert_eq!(post.path, "mpesa/transactionstatus/v1/query");
        assert_eq!(
            post.token,
            format!("token:{}", basic_credential("global-key", "global-secret"))
        );
        assert_eq!(post.payload["CommandID"], "TransactionStatusQuery");
        assert_eq!(post.payload["Initiator"], "global-op");
        assert_eq!(post.payload["IdentifierType"], "1");
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
    async fn test_legacy_entry_overlays_defaults() {
        let mut config = sample_config();
        config.legacy_credentials.insert(
            ServiceKind::TransactionStatus,
            fields(&[("initiator", "legacy-op")]),
        );
        let (mpesa, transport) = sdk(config);

        mpesa
            .check_transaction_status("OEI2AK4Q16", "600000", "Check", "")
            .await
            .unwrap();

        let post = transport.last_post();
        assert_eq!(post.payload["Initiator"], "legacy-op");
        assert_eq!(post.payload["SecurityCredential"], "global-credential");
    }

    #[tokio::test]
    async fn test_missing_initiator_fields_fail_before_io() {
        let mut config = sample_config();
        config.default_credentials.remove("security_credential");
        let (mpesa, transport) = sdk(config);

        let err = mpesa
            .check_transaction_status("OEI2AK4Q16", "600000", "Check", "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MpesaError::Config(ConfigError::MissingField(
                CredentialField::SecurityCredential
            ))
        ));
        assert!(transport.posts().is_empty());
    }
}
