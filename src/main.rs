//! `page2pdf` HTTP server.
//!
//! Reads configuration from `app.env` and the environment, then serves:
//!
//! ```text
//! GET /pdf?url=...   PDF download
//! GET /?url=...      same as /pdf
//! GET /health        {"status":"healthy",...}
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use page2pdf_api::AppState;
use page2pdf_api::config::env::{bind_address_from_env, from_env};
use page2pdf_api::integrations::axum::router;
use tokio::signal;

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
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

    log::info!("Shutdown signal received, finishing in-flight conversions...");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting page2pdf {}...", env!("CARGO_PKG_VERSION"));

    let config = from_env()?;
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let address = bind_address_from_env();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("✅ Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}
