use contact_relay::{app, config, mailer::SmtpMailer, service::ContactService};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load server config: {e}");
        panic!("failed to load server config: {e}");
    });
    tracing::info!(
        "Successfully loaded contact relay config, validation policy: {:?}",
        cfg.validation
    );

    // SMTP settings are read from the environment on every submission
    let service = ContactService::new(
        Arc::new(SmtpMailer::new()),
        config::process_env(),
        cfg.validation,
    );

    let router = app(Arc::new(service));

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to read local address");

    tracing::info!("Contact relay starting, listening on {}", addr);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
