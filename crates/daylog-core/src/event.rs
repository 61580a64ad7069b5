//! Timestamped conversation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// One timestamped message from a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
    /// The conversation session the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl Event {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, session_id: Option<SessionId>) -> Self {
        Self {
            timestamp,
            session_id,
        }
    }
}

/// An event suitable for daily aggregation.
///
/// This trait allows aggregation to work with different event representations
/// (e.g., [`Event`] from the transcript loader, or test fixtures).
pub trait ActivityEvent {
    /// Returns the event's timestamp.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Returns the session ID, if the event carries one.
    fn session_id(&self) -> Option<&SessionId>;
}

impl ActivityEvent for Event {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
}
