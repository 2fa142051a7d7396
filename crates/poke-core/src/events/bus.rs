//! Fan-out of handled pokes to observers.
//!
//! Each subscriber holds its own [`ReactionFilter`] and only sees matching
//! reactions. A subscriber that falls behind loses the oldest events; the
//! loss is counted on the stream instead of stalling the reactor.

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::debug;

use crate::events::{ReactionEvent, ReactionFilter};
use crate::reaction::Reaction;
use crate::types::NoticeEvent;

const DEFAULT_CAPACITY: usize = 128;

/// Publishes the outcome of every handled notice.
#[derive(Clone)]
pub struct ReactionBus {
    sender: broadcast::Sender<ReactionEvent>,
}

impl ReactionBus {
    /// Bus with the default backlog size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bus keeping at most `capacity` unread events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Observe every reaction published from now on.
    pub fn subscribe(&self) -> ReactionStream {
        self.subscribe_filtered(ReactionFilter::any())
    }

    /// Observe only reactions matching `filter`.
    pub fn subscribe_filtered(&self, filter: ReactionFilter) -> ReactionStream {
        ReactionStream {
            receiver: self.sender.subscribe(),
            filter,
            missed: 0,
        }
    }

    /// Whether any stream is attached.
    pub fn is_observed(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    /// Publish the outcome of one notice.
    ///
    /// Returns the number of streams the event reached before filtering.
    /// Nothing is built when no stream is attached.
    pub fn publish(&self, notice: &NoticeEvent, reaction: &Reaction) -> usize {
        if !self.is_observed() {
            return 0;
        }
        self.sender
            .send(ReactionEvent::new(notice, reaction.clone()))
            .unwrap_or(0)
    }
}

impl Default for ReactionBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A filtered view of the reactions published on a [`ReactionBus`].
pub struct ReactionStream {
    receiver: broadcast::Receiver<ReactionEvent>,
    filter: ReactionFilter,
    missed: u64,
}

impl ReactionStream {
    /// Filter this stream was created with.
    pub fn filter(&self) -> &ReactionFilter {
        &self.filter
    }

    /// Events lost because this stream fell behind. Filtered-out events
    /// are not counted.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Wait for the next matching reaction.
    ///
    /// Returns `None` once every bus handle is dropped and the backlog is read.
    pub async fn next(&mut self) -> Option<ReactionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => self.note_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching reaction already in the backlog, if any.
    pub fn try_next(&mut self) -> Option<ReactionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(TryRecvError::Lagged(n)) => self.note_lag(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    fn note_lag(&mut self, skipped: u64) {
        self.missed += skipped;
        debug!(skipped, total = self.missed, "Reaction stream fell behind");
    }
}
