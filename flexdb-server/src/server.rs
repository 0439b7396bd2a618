use std::net::SocketAddr;

use axum::Router;
use axum_server::Handle;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Serve `app` until SIGINT or SIGTERM, then drain in-flight requests
pub(crate) async fn serve(port: u16, app: Router) -> std::io::Result<()> {
    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));
    serve_with_handle(SocketAddr::from(([0, 0, 0, 0], port)), app, handle).await
}

async fn serve_with_handle(addr: SocketAddr, app: Router, handle: Handle) -> std::io::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
}

async fn shutdown_on_signal(handle: Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(None);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received SIGINT, shutting down gracefully");
        }
        _ = terminate => {
            tracing::warn!("Received SIGTERM, shutting down gracefully");
        }
    }
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("flexdb_axum=debug,flexdb=debug,{app_name}=debug,info").into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(debug_assertions)]
    tracing::debug!("Debug build: verbose logging enabled by default");
    tracing::debug!("Override the log filter with RUST_LOG, e.g. RUST_LOG=flexdb=trace");
}
