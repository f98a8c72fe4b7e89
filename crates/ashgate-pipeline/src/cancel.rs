//! Cooperative cancellation built on a `watch` channel.
//!
//! A [`CancelSource`] flips the flag once; any number of cloned
//! [`CancelToken`]s observe it. Suspendable sequences poll
//! [`CancelToken::is_cancelled`] at each yield point rather than being
//! interrupted — cancellation is cooperative by design (see the
//! concurrency rules in the crate docs).

use tokio::sync::watch;

/// The cancelling half. Dropping the source without calling
/// [`cancel`](CancelSource::cancel) leaves all tokens un-cancelled forever.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

/// The observing half. Cheap to clone; safe to poll from any yield point.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelSource {
    /// Creates a linked source/token pair.
    pub fn new() -> (CancelSource, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelSource { tx }, CancelToken { rx })
    }

    /// Signals cancellation to every linked token. Idempotent.
    pub fn cancel(&self) {
        // Send only fails when every token is gone, which is fine.
        let _ = self.tx.send(true);
    }
}

impl CancelToken {
    /// A token that can never be cancelled, for callers that run a
    /// suspendable sequence outside any pipeline.
    pub fn never() -> CancelToken {
        let (_tx, rx) = watch::channel(false);
        CancelToken { rx }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever on a
    /// [`never`](CancelToken::never) token.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Source dropped without cancelling — never resolves.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_starts_uncancelled() {
        let (_src, token) = CancelSource::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_reaches_all_clones() {
        let (src, token) = CancelSource::new();
        let other = token.clone();
        src.cancel();
        assert!(token.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_never_token_stays_uncancelled() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_future_resolves_on_cancel() {
        let (src, mut token) = CancelSource::new();
        src.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_future_pends_without_cancel() {
        let mut token = CancelToken::never();
        let result =
            tokio::time::timeout(Duration::from_secs(5), token.cancelled()).await;
        assert!(result.is_err(), "never-token should pend forever");
    }
}
