use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    CredentialField, MpesaError, MpesaTransport, Reversal, ReversalRequest, ServiceKind,
    TokenCache,
};

use super::{OperationContext, positive};

const REVERSAL_PATH: &str = "mpesa/reversal/v1/request";
const COMMAND: &str = "TransactionReversal";

pub struct ReversalService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> ReversalService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    /// Requests reversal of a completed transaction.
    #[instrument(skip(self), fields(transaction_id = %reversal.transaction_id))]
    pub async fn reverse(&self, reversal: Reversal) -> Result<Value, MpesaError> {
        let amount = positive(reversal.amount)?;
        if reversal.transaction_id.trim().is_empty() {
            return Err(MpesaError::InvalidInput("Transaction ID is required".into()));
        }
        let credentials = self.ctx.prepare(ServiceKind::Reversal)?;

        let request = ReversalRequest {
            initiator: credentials
                .require(CredentialField::InitiatorName)?
                .to_string(),
            security_credential: credentials
                .require(CredentialField::SecurityCredential)?
                .to_string(),
            command_id: COMMAND.to_string(),
            transaction_id: reversal.transaction_id,
            amount,
            receiver_party: reversal.receiver_party,
            receiver_identifier_type: reversal.receiver_identifier_type,
            result_url: self.ctx.callback_url(ServiceKind::Reversal, "result")?,
            queue_timeout_url: self.ctx.callback_url(ServiceKind::Reversal, "timeout")?,
            remarks: reversal.remarks,
            occasion: reversal.occasion,
        };

        self.ctx
            .dispatch(ServiceKind::Reversal, REVERSAL_PATH, &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Mpesa;
    use crate::test_support::{MapCache, MockTransport, sample_config, shared};

    fn reversal(amount: u64) -> Reversal {
        Reversal {
            transaction_id: "OEI2AK4Q16".into(),
            amount,
            receiver_party: "174379".into(),
            receiver_identifier_type: "11".into(),
            remarks: "Duplicate".into(),
            occasion: String::new(),
        }
    }

    #[tokio::test]
    async fn test_reverse_transaction() {
        let (config, transport, cache) = shared(sample_config());
        let mpesa: Mpesa<MockTransport, MapCache> =
            Mpesa::from_shared(config, transport.clone(), cache);

        mpesa.reverse_transaction(reversal(100)).await.unwrap();

        let post = transport.last_post();
        assert_eq!(post.path, "mpesa/reversal/v1/request");
        assert_eq!(post.payload["CommandID"], "TransactionReversal");
        assert_eq!(post.payload["TransactionID"], "OEI2AK4Q16");
        assert_eq!(post.payload["ReceiverParty"], "174379");
        assert_eq!(post.payload["RecieverIdentifierType"], "11");
        assert_eq!(post.payload["Initiator"], "biz-op");
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let (config, transport, cache) = shared(sample_config());
        let mpesa: Mpesa<MockTransport, MapCache> =
            Mpesa::from_shared(config, transport.clone(), cache);

        let err = mpesa.reverse_transaction(reversal(0)).await.unwrap_err();
        assert!(matches!(err, MpesaError::InvalidInput(_)));
        assert!(transport.posts().is_empty());
    }
}
