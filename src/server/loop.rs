// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight work

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Serve `listener` until `shutdown` resolves.
///
/// After shutdown the listener is closed, open connections are asked to
/// finish and get the configured grace period to do so, then pending
/// background work is drained within whatever time is left.
pub async fn run<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Future<Output = std::io::Result<&'static str>>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        graceful.watcher(),
                    ),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            signal = &mut shutdown => {
                logger::log_shutdown_requested(signal?);
                break;
            }
        }
    }
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    let deadline = tokio::time::Instant::now() + grace;
    tokio::select! {
        () = graceful.shutdown() => {}
        () = tokio::time::sleep_until(deadline) => {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {} connection(s) still open",
                active_connections.load(Ordering::SeqCst)
            ));
        }
    }

    let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
    let aborted = state.background.drain(remaining).await;
    logger::log_shutdown_complete(aborted);
    Ok(())
}
