//! Request-scoped cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Cancellation handle and optional deadline for one logical request.
///
/// Every Identity Service step that touches the store runs through
/// [`RequestContext::guard`], so a canceled or timed-out request aborts
/// before its next write instead of completing it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fail fast if the context is already canceled or past its deadline.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Run `fut` to completion unless the context is canceled or its
    /// deadline passes first. Cancellation wins ties.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CoreError::Canceled),
            () = deadline => Err(CoreError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
