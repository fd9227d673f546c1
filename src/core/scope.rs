use crate::utils::error::ErrorKind;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Why a scoped future did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    DeadlineExceeded,
    Cancelled,
}

impl Interrupted {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Interrupted::DeadlineExceeded => ErrorKind::Timeout,
            Interrupted::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupted::DeadlineExceeded => f.write_str("deadline exceeded"),
            Interrupted::Cancelled => f.write_str("lookup already resolved"),
        }
    }
}

/// Deadline plus cancellation signal shared by every fetcher of one lookup.
#[derive(Debug, Clone)]
pub struct CancellationScope {
    token: CancellationToken,
    deadline: Instant,
}

impl CancellationScope {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Same deadline; cancelled with this scope but can be cancelled alone.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels the scope when dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Drives `future` until it completes, the deadline passes, or the
    /// scope is cancelled. Cancellation is checked first.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Interrupted> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(Interrupted::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}
