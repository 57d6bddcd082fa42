//! Timeout and cancellation enforcement for runner calls.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout and cancellation are distinct errors, both map to `ErrorKind::Timeout`
//! - Losing the race drops the request future, which closes its connection

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::probe::outcome::ErrorKind;

/// Errors a runner can hit.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no response within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("cancelled before completion")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("truncated body: expected {expected} bytes, received {received}")]
    Truncated { expected: u64, received: u64 },
}

impl ProbeError {
    /// Fold into the two-valued error kind recorded in outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Timeout(_) | ProbeError::Cancelled => ErrorKind::Timeout,
            ProbeError::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }
}

/// Run `fut` until it completes, `budget` elapses or `cancel` fires.
pub async fn within<T, F>(budget: Duration, cancel: &CancellationToken, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        res = time::timeout(budget, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(ProbeError::Timeout(budget)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_budget() {
        let cancel = CancellationToken::new();
        let res = within(Duration::from_millis(200), &cancel, async { Ok::<_, ProbeError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let cancel = CancellationToken::new();
        let started = time::Instant::now();
        let res = within(Duration::from_millis(50), &cancel, async {
            time::sleep(Duration::from_secs(10)).await;
            Ok::<_, ProbeError>(())
        })
        .await;

        let err = res.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_wins_over_pending_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let res = within(Duration::from_secs(10), &cancel, async {
            time::sleep(Duration::from_secs(10)).await;
            Ok::<_, ProbeError>(())
        })
        .await;

        let err = res.unwrap_err();
        assert!(matches!(err, ProbeError::Cancelled));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_other_errors_map_to_other() {
        let err = ProbeError::Truncated {
            expected: 10,
            received: 4,
        };
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(
            ProbeError::Status(reqwest::StatusCode::BAD_GATEWAY).kind(),
            ErrorKind::Other
        );
    }
}
