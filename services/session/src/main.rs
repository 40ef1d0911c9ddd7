use std::net::SocketAddr;
use std::sync::Arc;

use rust_common::{init_tracing, RedisStore};
use session_service::config::{Config, ACCESS_TOKEN_TTL};
use session_service::grpc::SessionServiceImpl;
use session_service::jwt::TokenCodec;
use session_service::proto::session_service_server::SessionServiceServer;
use session_service::session::TokenEngine;
use session_service::storage::SessionStore;
use tonic::transport::Server;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.tracing)?;

    info!("Starting Session Service");
    if config.secret_is_short() {
        warn!("ACCESS_SECRET is shorter than 32 bytes");
    }

    let addr: SocketAddr = config.listen_addr().parse()?;

    let kv = RedisStore::connect(config.store.clone()).await?;
    let engine = Arc::new(TokenEngine::new(
        TokenCodec::new(&config.access_secret, ACCESS_TOKEN_TTL),
        SessionStore::new(Arc::new(kv)),
    ));
    let service = SessionServiceImpl::new(engine);

    info!(ttl_secs = ACCESS_TOKEN_TTL.as_secs(), "Session Service listening on {}", addr);

    Server::builder()
        .add_service(SessionServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    info!("Session Service stopped");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
