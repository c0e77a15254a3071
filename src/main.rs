//! Visitor Queue Server - Binary Entry Point
//!
//! This is the main entry point for the queue-server binary.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visitor_queue::api::{create_router, AppState};
use visitor_queue::broadcast::{Broadcaster, Heartbeat};
use visitor_queue::config::Config;
use visitor_queue::queue::QueueService;
use visitor_queue::store::{FileTicketStore, TicketStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visitor_queue=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(version = visitor_queue::VERSION, "Starting visitor queue server");

    let config = Config::from_env();

    let store: Arc<dyn TicketStore> = match &config.store.data_file {
        Some(path) => Arc::new(FileTicketStore::open(path)?),
        None => {
            warn!("QUEUE_DATA_FILE not set, tickets are kept in memory only");
            Arc::new(FileTicketStore::in_memory())
        }
    };

    let broadcaster = Broadcaster::new(config.broadcast.subscriber_buffer);
    let service = Arc::new(QueueService::new(
        store,
        broadcaster.clone(),
        config.selection_policy(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let heartbeat = config.heartbeat_period().map(|period| {
        tokio::spawn(Heartbeat::new(broadcaster.clone(), period).run(shutdown_rx))
    });

    let app = create_router(Arc::new(AppState::new(service)));
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Listening");

    let closing = broadcaster.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Ends every open stream so the server can drain
            let closed = closing.shutdown();
            info!(subscribers = closed, "Closed live subscriptions");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Some(heartbeat) = heartbeat {
        let _ = heartbeat.await;
    }

    info!("Visitor queue server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
