use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Cooperative cancellation observed by the retry loop.
///
/// A signal is checked before every attempt and raced against every backoff
/// delay. It never aborts an in-flight transport call; once it fires, no new
/// attempt or delay starts and the call returns [`Error::Cancelled`].
///
/// Signals are cheap to clone and share. The default signal never fires.
///
/// [`Error::Cancelled`]: crate::Error::Cancelled
///
/// # Example
///
/// ```
/// use retryable_http::{CancelHandle, CancelSignal};
///
/// let handle = CancelHandle::new();
/// let signal = handle.signal();
/// assert!(!signal.is_cancelled());
///
/// handle.cancel();
/// assert!(signal.is_cancelled());
///
/// // Deadline-based signals need no handle.
/// let _timeout = CancelSignal::timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Clone, Debug)]
pub struct CancelSignal {
    inner: Inner,
}

#[derive(Clone, Debug)]
enum Inner {
    Never,
    Deadline(Instant),
    Flag(watch::Receiver<bool>),
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { inner: Inner::Never }
    }

    /// A signal that fires once `deadline` passes.
    pub fn deadline(deadline: Instant) -> Self {
        Self {
            inner: Inner::Deadline(deadline),
        }
    }

    /// A signal that fires `after` from now.
    pub fn timeout(after: Duration) -> Self {
        Self::deadline(Instant::now() + after)
    }

    /// Returns true once the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        match &self.inner {
            Inner::Never => false,
            Inner::Deadline(deadline) => Instant::now() >= *deadline,
            Inner::Flag(rx) => *rx.borrow(),
        }
    }

    /// Resolves when the signal fires; pends forever if it never can.
    pub async fn cancelled(&self) {
        match &self.inner {
            Inner::Never => std::future::pending().await,
            Inner::Deadline(deadline) => tokio::time::sleep_until(*deadline).await,
            Inner::Flag(rx) => {
                let mut rx = rx.clone();
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    // Handle dropped without cancelling; nothing can fire anymore.
                    std::future::pending::<()>().await
                }
            }
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

/// Cancels every [`CancelSignal`] issued from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A new signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            inner: Inner::Flag(self.tx.subscribe()),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true if [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
