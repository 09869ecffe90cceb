use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `cancellation` once the process receives Ctrl-C. Returns early if the token gets
/// cancelled by someone else.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => (),
    };
}
