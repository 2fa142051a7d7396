//! Terminal outcomes of handling one inbound notice.
//!
//! - `Reaction`: where the notice ended up (ignored, suppressed, dispatched)
//! - `IgnoreReason`: why a notice never reached the cooldown check
//! - `DispatchAction`: what was sent to the host, if anything

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Why a notice was ignored before any cooldown bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Not a poke notice
    NotPoke,
    /// Notice from a platform other than the configured one
    ForeignPlatform,
    /// Someone other than the bot was poked while self-only filtering is on
    NotSelfTarget,
}

/// What the reactor handed to the host after accepting a poke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchAction {
    /// Command executed through the host
    Command { content: String },
    /// Rendered reply queued to the conversation
    Message { content: String },
    /// Probability roll missed; nothing sent
    ProbabilityMiss { roll: f64, probability: f64 },
    /// Message policy without templates; nothing sent
    NoTemplates,
}

impl DispatchAction {
    /// Whether something was actually sent to the host
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Command { .. } | Self::Message { .. })
    }
}

/// Which terminal state a reaction reached, without its details.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    #[strum(serialize = "poke.ignored")]
    Ignored,
    #[strum(serialize = "poke.suppressed")]
    Suppressed,
    #[strum(serialize = "poke.dispatched")]
    Dispatched,
}

/// Terminal state of one notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Reaction {
    /// Filtered out; the cooldown ledger was not touched
    Ignored { reason: IgnoreReason },
    /// Inside the user's cooldown; the ledger was not touched
    Suppressed {
        user_id: String,
        remaining_ms: u64,
        warned: bool,
    },
    /// Accepted and recorded; the action may still be silent
    Dispatched {
        user_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        group_id: Option<String>,
        action: DispatchAction,
    },
}

impl Reaction {
    /// Create an ignored reaction
    pub fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    /// Terminal state of this reaction
    pub fn kind(&self) -> ReactionKind {
        match self {
            Self::Ignored { .. } => ReactionKind::Ignored,
            Self::Suppressed { .. } => ReactionKind::Suppressed,
            Self::Dispatched { .. } => ReactionKind::Dispatched,
        }
    }

    /// Event type name, e.g. `poke.suppressed`
    pub fn event_type(&self) -> &'static str {
        self.kind().into()
    }

    /// Check if the notice was ignored
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Check if the poke was suppressed by the cooldown
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed { .. })
    }

    /// Check if the poke was accepted
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }

    /// The dispatch action, for accepted pokes
    pub fn action(&self) -> Option<&DispatchAction> {
        match self {
            Self::Dispatched { action, .. } => Some(action),
            _ => None,
        }
    }
}
