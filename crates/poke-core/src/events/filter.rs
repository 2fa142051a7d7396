//! Subscription filters over handled pokes.

use crate::events::ReactionEvent;
use crate::reaction::ReactionKind;

/// Selects which reactions a subscriber sees.
///
/// An empty filter matches everything. Each constraint narrows the match:
/// kinds are alternatives, user and group must both hold when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionFilter {
    kinds: Vec<ReactionKind>,
    user_id: Option<String>,
    group_id: Option<String>,
}

impl ReactionFilter {
    /// Match every reaction
    pub fn any() -> Self {
        Self::default()
    }

    /// Also accept reactions of `kind`
    pub fn kind(mut self, kind: ReactionKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Only reactions to pokes from this user
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Only reactions to pokes inside this group
    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Whether `event` passes every constraint.
    pub fn matches(&self, event: &ReactionEvent) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind()) {
            return false;
        }
        if let Some(user_id) = &self.user_id {
            if *user_id != event.user_id {
                return false;
            }
        }
        match &self.group_id {
            Some(group_id) => event.group_id.as_ref() == Some(group_id),
            None => true,
        }
    }
}
