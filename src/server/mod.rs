//! Upload/download web service
//!
//! Serves the upload page, accepts PDFs, splits them on a blocking worker and
//! exposes the results per task. A background sweeper deletes old tasks.

pub mod archive;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod routes;
pub mod tasks;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{router, AppState};
pub use tasks::TaskStore;

use tracing::info;

/// Bind, start the sweeper and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    config.ensure_dirs()?;

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    let addr = listener.local_addr()?;

    let sweeper = if config.cleanup {
        Some(cleanup::spawn_cleanup(config.clone()))
    } else {
        info!("cleanup sweeper disabled");
        None
    };

    info!(
        %addr,
        uploads = %config.upload_dir.display(),
        outputs = %config.output_dir.display(),
        "server started"
    );

    let app = router(AppState::new(config));
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
