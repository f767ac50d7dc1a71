//! # M-Pesa Webhook Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Report per-service configuration problems
//! - Start the webhook server
//! - Log every republished notification

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpesa_core::{ConfigValidator, CredentialSelector, inbound::WebhookServer};
use mpesa_types::{MpesaConfig, WebhookEvent};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("mpesa-webhooks"), provider))
}

/// Logs a warning for every service that could not be called as configured.
fn report_configuration(config: Arc<MpesaConfig>) {
    let validator = ConfigValidator::new(CredentialSelector::new(config));
    for (service, result) in validator.validate_all() {
        match result {
            Ok(result) if result.is_valid() => {
                tracing::debug!(%service, "Service configuration complete");
            }
            Ok(result) => {
                for error in &result.errors {
                    tracing::warn!(%service, "{}", error);
                }
            }
            Err(e) => tracing::warn!(%service, "{}", e),
        }
    }
}

async fn log_events(mut events: broadcast::Receiver<WebhookEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                tracing::info!(
                    id = %event.id,
                    name = %event.name,
                    received_at = %event.received_at,
                    "Webhook event published"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event logger fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mpesa_app=debug,mpesa_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting M-Pesa webhook server on port {}", config.port);
    tracing::info!("Environment: {}", config.mpesa.environment);

    let mpesa = Arc::new(config.mpesa);
    report_configuration(mpesa.clone());

    let server = WebhookServer::from_config(&mpesa);
    tokio::spawn(log_events(server.subscribe()));

    // Build HTTP metrics layer (uses globally set MeterProvider)
    let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();
    let router = server.router().layer(metrics);
    let addr = format!("0.0.0.0:{}", config.port);

    mpesa_core::inbound::serve(router, &addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
