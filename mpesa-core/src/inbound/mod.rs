//! Webhook Inbound Adapter
//!
//! Axum router that receives provider notifications and republishes them
//! as [`WebhookEvent`](mpesa_types::WebhookEvent)s on a broadcast channel.

mod handlers;
mod server;

pub use handlers::C2bValidator;
pub use server::{WEBHOOK_PREFIX, WebhookServer, serve};
