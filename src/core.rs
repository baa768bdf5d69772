use std::borrow::Borrow;
use tokio::sync::mpsc;
use tracing::error;

/// Send a message to the specified Tokio mpsc::Sender, and if sending fails,
/// log an error with Tracing.
// Progress receivers may be dropped mid-operation - that's the consumer's
// choice, not a failure of the producing stage.
pub async fn send_or_error<T, S: Borrow<mpsc::Sender<T>>>(tx: S, msg: T) {
    tx.borrow()
        .send(msg)
        .await
        .unwrap_or_else(|e| error!("Error {e} received when sending message"));
}
