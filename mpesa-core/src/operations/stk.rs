use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use mpesa_types::{
    CredentialField, MpesaError, MpesaTransport, ServiceKind, StkPushRequest, StkQueryRequest,
    TokenCache,
};

use super::{OperationContext, positive, subscriber};
use crate::security::generate_password;
use crate::util::generate_timestamp;

const PUSH_PATH: &str = "mpesa/stkpush/v1/processrequest";
const QUERY_PATH: &str = "mpesa/stkpushquery/v1/query";
const DEFAULT_TRANSACTION_TYPE: &str = "CustomerPayBillOnline";

/// Push payments (Lipa na M-Pesa Online).
pub struct StkService<T: MpesaTransport, C: TokenCache> {
    ctx: Arc<OperationContext<T, C>>,
}

impl<T: MpesaTransport, C: TokenCache> StkService<T, C> {
    pub(crate) fn new(ctx: Arc<OperationContext<T, C>>) -> Self {
        Self { ctx }
    }

    /// Prompts `phone` to pay `amount` to the configured shortcode.
    ///
    /// `transaction_type` falls back to the binding's `type` setting, then
    /// to `CustomerPayBillOnline`.
    #[instrument(skip(self, description))]
    pub async fn push(
        &self,
        phone: &str,
        amount: u64,
        reference: &str,
        description: &str,
        transaction_type: Option<&str>,
    ) -> Result<Value, MpesaError> {
        let phone = subscriber(phone)?;
        let amount = positive(amount)?;
        let credentials = self.ctx.prepare(ServiceKind::Stk)?;

        let short_code = credentials.require(CredentialField::ShortCode)?;
        let pass_key = credentials.require(CredentialField::PassKey)?;
        let timestamp = generate_timestamp();
        let transaction_type = transaction_type
            .or_else(|| self.ctx.config().service_setting(ServiceKind::Stk, "type"))
            .unwrap_or(DEFAULT_TRANSACTION_TYPE);

        let request = StkPushRequest {
            business_short_code: short_code.to_string(),
            password: generate_password(short_code, pass_key, &timestamp),
            timestamp,
            transaction_type: transaction_type.to_string(),
            amount,
            party_a: phone.clone(),
            party_b: short_code.to_string(),
            phone_number: phone,
            callback_url: self.ctx.callback_url(ServiceKind::Stk, "callback")?,
            account_reference: reference.to_string(),
            transaction_desc: description.to_string(),
        };

        self.ctx.dispatch(ServiceKind::Stk, PUSH_PATH, &request).await
    }

    /// Status of an earlier push.
    #[instrument(skip(self))]
    pub async fn query(&self, checkout_request_id: &str) -> Result<Value, MpesaError> {
        let credentials = self.ctx.prepare(ServiceKind::Stk)?;

        let short_code = credentials.require(CredentialField::ShortCode)?;
        let pass_key = credentials.require(CredentialField::PassKey)?;
        let timestamp = generate_timestamp();

        let request = StkQueryRequest {
            business_short_code: short_code.to_string(),
            password: generate_password(short_code, pass_key, &timestamp),
            timestamp,
            checkout_request_id: checkout_request_id.to_string(),
        };

        self.ctx.dispatch(ServiceKind::Stk, QUERY_PATH, &request).await
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde_json::json;

    use super::*;
    use crate::operations::Mpesa;
    use crate::security::basic_credential;
    use crate::test_support::{MapCache, MockTransport, sample_config, shared};
    use mpesa_types::{ConfigError, CredentialProfile, MpesaConfig, TransportError};

    fn sdk(config: MpesaConfig) -> (Mpesa<MockTransport, MapCache>, Arc<MockTransport>) {
        let (config, transport, cache) = shared(config);
        (Mpesa::from_shared(config, transport.clone(), cache), transport)
    }

    #[tokio::test]
    async fn test_push_builds_request_from_bound_profile() {
        let (mpesa, transport) = sdk(sample_config());

        let response = mpesa
            .stk()
            .push("0712345678", 100, "INV-1", "Order 1", None)
            .await
            .unwrap();
        assert_eq!(response["ResponseCode"], "0");

        let post = transport.last_post();
        assert_eq!(post.path, "mpesa/stkpush/v1/processrequest");
        assert_eq!(
            post.token,
            format!("token:{}", basic_credential("default-key", "default-secret"))
        );

        let body = &post.payload;
        assert_eq!(body["BusinessShortCode"], "174379");
        assert_eq!(body["PartyA"], "254712345678");
        assert_eq!(body["PartyB"], "174379");
        assert_eq!(body["PhoneNumber"], "254712345678");
        assert_eq!(body["Amount"], 100);
        assert_eq!(body["TransactionType"], "CustomerPayBillOnline");
        assert_eq!(body["CallBackURL"], "https://callbacks.example.com/stk/callback");
        assert_eq!(body["AccountReference"], "INV-1");

        let timestamp = body["Timestamp"].as_str().unwrap();
        let decoded = STANDARD.decode(body["Password"].as_str().unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            format!("174379lipa-passkey{}", timestamp)
        );
    }

    #[tokio::test]
    async fn test_transaction_type_precedence() {
        let mut config = sample_config();
        config
            .services
            .get_mut(&ServiceKind::Stk)
            .unwrap()
            .config
            .insert("type".into(), "CustomerBuyGoodsOnline".into());
        let (mpesa, transport) = sdk(config);

        mpesa
            .stk()
            .push("0712345678", 10, "r", "d", None)
            .await
            .unwrap();
        assert_eq!(
            transport.last_post().payload["TransactionType"],
            "CustomerBuyGoodsOnline"
        );

        mpesa
            .stk()
            .push("0712345678", 10, "r", "d", Some("CustomerPayBillOnline"))
            .await
            .unwrap();
        assert_eq!(
            transport.last_post().payload["TransactionType"],
            "CustomerPayBillOnline"
        );
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_io() {
        let (mpesa, transport) = sdk(sample_config());

        let bad_phone = mpesa.stk().push("12345", 100, "r", "d", None).await;
        assert!(matches!(bad_phone, Err(MpesaError::InvalidInput(_))));

        let zero = mpesa.stk().push("0712345678", 0, "r", "d", None).await;
        assert!(matches!(zero, Err(MpesaError::InvalidInput(_))));

        assert!(transport.token_requests().is_empty());
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_passkey_aborts_with_every_problem() {
        let mut config = sample_config();
        config.profiles.insert(
            "lipa_na_mpesa".into(),
            CredentialProfile::extending("default", Default::default()),
        );
        config.callbacks.per_service.clear();
        config.callbacks.base_url = None;
        let (mpesa, transport) = sdk(config);

        let err = mpesa
            .stk()
            .push("0712345678", 100, "r", "d", None)
            .await
            .unwrap_err();
        match err {
            MpesaError::Config(ConfigError::Incomplete { errors, .. }) => {
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn test_query_posts_checkout_id() {
        let (mpesa, transport) = sdk(sample_config());
        transport.respond_to_posts_with(Ok(json!({"ResultCode": "0"})));

        let response = mpesa.stk_query("ws_CO_123").await.unwrap();
        assert_eq!(response["ResultCode"], "0");

        let post = transport.last_post();
        assert_eq!(post.path, "mpesa/stkpushquery/v1/query");
        assert_eq!(post.payload["CheckoutRequestID"], "ws_CO_123");
        assert_eq!(post.payload["BusinessShortCode"], "174379");
    }

    #[tokio::test]
    async fn test_provider_rejection_is_surfaced() {
        let (mpesa, transport) = sdk(sample_config());
        transport.respond_to_posts_with(Err(TransportError::RequestFailed {
            status: 400,
            body: r#"{"errorCode":"400.002.02"}"#.into(),
        }));

        let err = mpesa
            .stk_push("0712345678", 1, "r", "d")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MpesaError::Transport(TransportError::RequestFailed { status: 400, .. })
        ));
    }
}
