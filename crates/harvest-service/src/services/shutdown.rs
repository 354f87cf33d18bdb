//! Cooperative shutdown for the long-running loops

use std::time::Duration;

use tokio::sync::watch;

/// Receiving end of the shutdown flag; `true` means stop
pub type ShutdownSignal = watch::Receiver<bool>;

/// Whether shutdown has been requested
pub fn requested(shutdown: &ShutdownSignal) -> bool {
    *shutdown.borrow()
}

/// Sleep for `duration` unless shutdown arrives first
///
/// Returns `true` when the caller should stop. A dropped sender counts as a
/// shutdown request.
pub async fn pause(duration: Duration, shutdown: &mut ShutdownSignal) -> bool {
    if requested(shutdown) {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => false,
        _ = shutdown.wait_for(|stop| *stop) => true,
    }
}
