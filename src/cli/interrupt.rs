//! Interrupt handling.
//!
//! Ctrl-C does not touch the run state directly. It cancels the token the
//! scheduler watches; the scheduler stops at the next opportunity and the
//! normal report path flushes whatever whole batches were collected. A
//! second Ctrl-C while flushing exits immediately.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Exit code used after an interrupted run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Cancel `token` once `signal` resolves.
pub async fn cancel_on<F: Future<Output = ()>>(signal: F, token: CancellationToken) {
    signal.await;
    token.cancel();
}

/// Install the process Ctrl-C handler. Only the first call installs;
/// later calls return false and do nothing.
pub fn install(token: CancellationToken) -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    tokio::spawn(async move {
        let first = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            eprintln!(
                "\n{} Interrupt received, flushing collected results (Ctrl-C again to abort)",
                style("!").yellow()
            );
        };
        cancel_on(first, token).await;

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    true
}
