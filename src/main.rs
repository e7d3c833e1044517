use day_tracker::{router, AppState, HttpRemote, OfflineRemote, RemoteStore, Tracker, TrackerConfig};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = TrackerConfig::from_env()?;
    match HttpRemote::from_config(&config) {
        Some(remote) => {
            let remote = remote?;
            info!(url = %remote.url(), "using remote record store");
            serve(config, remote).await
        }
        None => {
            warn!("TRACKER_REMOTE_URL not set; running on the local cache only");
            serve(config, OfflineRemote).await
        }
    }
}

async fn serve<R: RemoteStore>(
    config: TrackerConfig,
    remote: R,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let drain = config.shutdown_drain;

    let tracker = Tracker::boot(config, remote).await;
    let app = router(AppState::new(tracker.clone()));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    let pending = tracker.pending_writes();
    if pending > 0 {
        info!(pending, "waiting for remote saves to land");
        if tokio::time::timeout(drain, tracker.settled()).await.is_err() {
            warn!(
                pending = tracker.pending_writes(),
                "shutting down with remote saves still in flight"
            );
        }
    }

    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
