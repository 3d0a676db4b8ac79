//! Cancellation and deadline checks for long-running analyses

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{GraphError, GraphResult};

/// A handle for cancelling an analysis from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run holding a clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-run limits checked once per iteration
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl RunControl {
    /// No cancellation, no deadline
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline measured from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the run was cancelled or its deadline has passed
    pub fn check(&self, iterations: usize) -> GraphResult<()> {
        if self.token.as_ref().map_or(false, CancellationToken::is_cancelled) {
            return Err(GraphError::Cancelled { iterations });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(GraphError::DeadlineExceeded { iterations });
            }
        }
        Ok(())
    }
}
