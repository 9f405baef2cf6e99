//! cleanlog-server - main entry point
//!
//! Opens the database, prepares the uploads directory, starts the daily
//! report scheduler (when mail is configured) and serves the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use cleanlog_common::db::init_database;
use cleanlog_common::EventBus;
use cleanlog_server::config::Config;
use cleanlog_server::report::{spawn_daily_report, SmtpMailer};
use cleanlog_server::store::RecordStore;
use cleanlog_server::uploads::UploadStore;
use cleanlog_server::{build_router, AppState, EVENT_BUS_CAPACITY};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cleanlog_server=info,cleanlog_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cleanlog-server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("Failed to load configuration")?;

    // Schema initialization failure is fatal
    let pool = init_database(&config.database_url)
        .await
        .with_context(|| format!("Failed to initialize database {}", config.database_url))?;
    let store = RecordStore::new(pool);

    let uploads = UploadStore::new(&config.uploads_dir);
    uploads
        .ensure_directory_exists()
        .with_context(|| format!("Failed to create uploads directory {}", config.uploads_dir.display()))?;
    info!("Uploads directory: {}", config.uploads_dir.display());
    info!("Public directory: {}", config.public_dir.display());

    match &config.mail {
        Some(mail) => {
            let mailer = SmtpMailer::new(mail).context("Failed to configure SMTP relay")?;
            spawn_daily_report(store.clone(), Arc::new(mailer), mail.to.clone(), mail.report_time);
            info!(
                "Daily report to {} at {} via {}:{}",
                mail.to,
                mail.report_time.format("%H:%M"),
                mail.smtp_host,
                mail.smtp_port
            );
        }
        None => info!("Mail not configured (SMTP_HOST / REPORT_TO); daily report disabled"),
    }

    let state = AppState::new(
        store,
        uploads,
        EventBus::new(EVENT_BUS_CAPACITY),
        config.public_dir.clone(),
        config.ws_interval,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
