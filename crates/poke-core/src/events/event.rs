//! Reaction lifecycle events.
//!
//! One event is emitted per handled notice, carrying the terminal
//! [`Reaction`] so observers can count, log, or audit pokes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reaction::{Reaction, ReactionKind};
use crate::types::NoticeEvent;

/// A handled notice and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Unique event ID
    pub event_id: String,
    /// User who poked
    pub user_id: String,
    /// Originating group, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Host timestamp of the notice, in milliseconds
    pub notice_timestamp: u64,
    /// Terminal outcome
    pub reaction: Reaction,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
}

impl ReactionEvent {
    /// Record the outcome of `notice`, stamped with a fresh id and the current time.
    pub fn new(notice: &NoticeEvent, reaction: Reaction) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            user_id: notice.user_id.clone(),
            group_id: notice.group_id().map(str::to_string),
            notice_timestamp: notice.timestamp,
            reaction,
            timestamp: Utc::now(),
        }
    }

    /// Terminal state of the reaction
    pub fn kind(&self) -> ReactionKind {
        self.reaction.kind()
    }

    /// Event type name, e.g. `poke.dispatched`
    pub fn event_type(&self) -> &'static str {
        self.reaction.event_type()
    }
}
