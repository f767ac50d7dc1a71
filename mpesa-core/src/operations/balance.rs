use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    BalanceQueryRequest, CredentialField, MpesaError, MpesaTransport, ServiceKind, TokenCache,
};

use super::OperationContext;

const QUERY_PATH: &str = "mpesa/accountbalance/v1/query";

pub const DEFAULT_COMMAND: &str = "AccountBalance";
/// Identifier type of an organisation shortcode.
pub const SHORTCODE_IDENTIFIER: &str = "4";

/// Account balance queries. The balance arrives later on the result callback.
pub struct BalanceService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> BalanceService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn query(
        &self,
        remarks: &str,
        command_id: &str,
        identifier_type: &str,
    ) -> Result<Value, MpesaError> {
        let credentials = self.ctx.prepare(ServiceKind::Balance)?;

        let request = BalanceQueryRequest {
            initiator: credentials
                .require(CredentialField::InitiatorName)?
                .to_string(),
            security_credential: credentials
                .require(CredentialField::SecurityCredential)?
                .to_string(),
            command_id: command_id.to_string(),
            party_a: credentials.require(CredentialField::ShortCode)?.to_string(),
            identifier_type: identifier_type.to_string(),
            remarks: remarks.to_string(),
            queue_timeout_url: self.ctx.callback_url(ServiceKind::Balance, "timeout")?,
            result_url: self.ctx.callback_url(ServiceKind::Balance, "result")?,
        };

        self.ctx
            .dispatch(ServiceKind::Balance, QUERY_PATH, &request)
            .await
    }
}
