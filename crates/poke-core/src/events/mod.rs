//! Reaction events
//!
//! - `ReactionEvent`: one handled notice and its outcome
//! - `ReactionFilter`: which outcomes a subscriber wants
//! - `ReactionBus`: fan-out to filtered `ReactionStream`s

mod bus;
mod event;
mod filter;

pub use bus::{ReactionBus, ReactionStream};
pub use event::ReactionEvent;
pub use filter::ReactionFilter;
