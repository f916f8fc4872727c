//! Cancellation signal shared by one query batch.
//!
//! A [`CancelHandle`] fires the signal; every clone of the paired
//! [`CancelToken`] observes it. Dropping the handle without firing leaves the
//! token uncancelled forever.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Create a connected handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Sending side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Fire the signal once `deadline` has elapsed.
    ///
    /// Abort the returned task to disarm the deadline.
    pub fn cancel_after(self, deadline: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            self.cancel();
        })
    }

    /// A new token observing this handle.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side of a cancellation signal. Cheap to clone.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        cancel_pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires; pends forever if it never can.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}
