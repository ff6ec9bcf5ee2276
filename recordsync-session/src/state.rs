use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an edit session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Showing the persisted record. The initial state.
    #[default]
    Viewing,
    /// The draft is open for writes.
    Editing,
    /// A validated draft has been sent and the response is pending.
    Submitting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Viewing => "viewing",
            SessionState::Editing => "editing",
            SessionState::Submitting => "submitting",
        })
    }
}
