//! Webhook server configuration and startup.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::Value;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use mpesa_types::{MpesaConfig, WebhookEvent, WebhookKind};

use super::handlers::{self, C2bValidator, WebhookState};

/// Mount point of every webhook route.
pub const WEBHOOK_PREFIX: &str = "/mpesa/webhooks";

const EVENT_CAPACITY: usize = 256;

/// HTTP server for provider notifications.
pub struct WebhookServer {
    state: Arc<WebhookState>,
}

impl WebhookServer {
    pub fn new(log_payloads: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(WebhookState {
                events,
                log_payloads,
                c2b_validator: None,
            }),
        }
    }

    pub fn from_config(config: &MpesaConfig) -> Self {
        Self::new(config.logging.enabled)
    }

    /// Installs the C2B validation hook. Must be called before `router()`.
    pub fn with_c2b_validator<F>(self, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let validator: C2bValidator = Arc::new(validator);
        Self {
            state: Arc::new(WebhookState {
                events: self.state.events.clone(),
                log_payloads: self.state.log_payloads,
                c2b_validator: Some(validator),
            }),
        }
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WebhookEvent> {
        self.state.events.subscribe()
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let mut webhooks = Router::new().route(
            WebhookKind::C2bValidation.path(),
            post(handlers::c2b_validation),
        );

        for &kind in WebhookKind::all() {
            if kind == WebhookKind::C2bValidation {
                continue;
            }
            webhooks = webhooks.route(
                kind.path(),
                post(
                    move |state: State<Arc<WebhookState>>, body: Json<Value>| {
                        handlers::receive(state, kind, body)
                    },
                ),
            );
        }

        Router::new()
            .route("/health", get(handlers::health))
            .nest(WEBHOOK_PREFIX, webhooks)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        serve(self.router(), addr).await
    }
}

/// Serves `router` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(router: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Webhook server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
