use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for edit sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on one submission's remote call (ms). `None` waits for
    /// the client's own timeout.
    pub submit_timeout_ms: Option<u64>,
    /// After a failed submission, re-run validation on every field write so
    /// inline errors track the draft.
    pub revalidate_on_change: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            submit_timeout_ms: Some(30_000),
            revalidate_on_change: true,
        }
    }
}

impl SessionConfig {
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_ms.map(Duration::from_millis)
    }
}
