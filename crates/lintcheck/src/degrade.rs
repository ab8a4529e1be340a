//! Attempt-and-degrade: run a fallible operation, and on error log a warning
//! and substitute a degraded value instead of propagating. Host API failures
//! reduce functionality, they never abort the run.

use std::future::Future;

use tracing::warn;

/// Await `op`; on error log a warning naming `what` and return `fallback`.
pub async fn attempt_or<T, E, F>(op: F, fallback: T, what: &str) -> T
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match op.await {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "{what} failed, continuing without it");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let value = attempt_or(async { Ok::<_, std::io::Error>(7) }, 0, "op").await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn substitutes_fallback_on_error() {
        let value = attempt_or(
            async { Err::<u32, _>(std::io::Error::other("denied")) },
            0,
            "op",
        )
        .await;
        assert_eq!(value, 0);
    }
}
