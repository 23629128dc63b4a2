use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;

/// Which of the two composed signals fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Cancelled,
    Timeout,
}

impl From<AbortReason> for AppError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::Cancelled => AppError::Cancelled,
            AbortReason::Timeout => AppError::Timeout,
        }
    }
}

/// A caller cancellation token and an internal timeout folded into one token.
///
/// The first of the two to fire cancels [`CombinedSignal::token`] and records
/// its [`AbortReason`]. Dropping the signal stops the timeout watcher.
pub struct CombinedSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<AbortReason>>,
    watcher: JoinHandle<()>,
}

impl CombinedSignal {
    pub fn new(external: Option<CancellationToken>, timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let reason = Arc::new(OnceLock::new());

        let token_clone = token.clone();
        let reason_clone = Arc::clone(&reason);
        let watcher = tokio::spawn(async move {
            let external_cancelled = async move {
                match external {
                    Some(t) => t.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                _ = external_cancelled => {
                    let _ = reason_clone.set(AbortReason::Cancelled);
                }
                _ = tokio::time::sleep(timeout) => {
                    let _ = reason_clone.set(AbortReason::Timeout);
                }
            }
            token_clone.cancel();
        });

        Self { token, reason, watcher }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn reason(&self) -> Option<AbortReason> {
        self.reason.get().copied()
    }

    /// Resolves once either signal fires.
    pub async fn aborted(&self) -> AbortReason {
        self.token.cancelled().await;
        self.reason().unwrap_or(AbortReason::Cancelled)
    }
}

impl Drop for CombinedSignal {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_fires_without_external_signal() {
        let signal = CombinedSignal::new(None, Duration::from_millis(20));
        assert_eq!(signal.aborted().await, AbortReason::Timeout);
        assert!(signal.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_external_cancel_wins_over_timeout() {
        let external = CancellationToken::new();
        let signal = CombinedSignal::new(Some(external.clone()), Duration::from_secs(60));
        external.cancel();
        assert_eq!(signal.aborted().await, AbortReason::Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_external_token() {
        let external = CancellationToken::new();
        external.cancel();
        let signal = CombinedSignal::new(Some(external), Duration::from_secs(60));
        assert_eq!(signal.aborted().await, AbortReason::Cancelled);
    }

    #[tokio::test]
    async fn test_not_aborted_before_either_fires() {
        let external = CancellationToken::new();
        let signal = CombinedSignal::new(Some(external), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!signal.token().is_cancelled());
        assert_eq!(signal.reason(), None);
    }

    #[test]
    fn test_reason_maps_to_error() {
        assert!(matches!(AppError::from(AbortReason::Timeout), AppError::Timeout));
        assert!(matches!(AppError::from(AbortReason::Cancelled), AppError::Cancelled));
    }
}
