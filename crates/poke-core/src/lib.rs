//! poke-core - Decision core for chat-bot poke reactions.
//!
//! This crate decides how a bot answers when it is poked: per-user cooldowns,
//! per-group policy resolution, probability-gated commands and weighted
//! random replies. It also builds outbound pokes for the `poke [target]`
//! command. Everything the host owns (event delivery, command execution,
//! protocol adapters) sits behind the [`Session`] trait.
//!
//! # Example
//!
//! ```ignore
//! use poke_core::{NoticeEvent, PokeConfig, PokeReactor};
//!
//! let config = PokeConfig::from_file("poke.toml")?.with_env_overrides();
//! let reactor = PokeReactor::new();
//!
//! // For each inbound notice the host delivers
//! let event = NoticeEvent::poke("10001", "bot", "bot", now_ms);
//! let reaction = reactor.handle(&config, &event, &session).await?;
//! ```

pub mod chooser;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod initiator;
pub mod reaction;
pub mod reactor;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{GroupOverride, PokeConfig, PokeConfigBuilder};
pub use cooldown::{CooldownDecision, CooldownTracker};
pub use error::{ErrorCode, PokeError, PokeResult};
pub use events::{ReactionBus, ReactionEvent, ReactionFilter, ReactionStream};
pub use initiator::PokeInitiator;
pub use reaction::{DispatchAction, IgnoreReason, Reaction, ReactionKind};
pub use reactor::PokeReactor;
pub use session::{render_placeholders, Session};
pub use types::{
    CommandInvocation, CommandPolicy, NoticeEvent, PokeKind, PokeRequest, ReplyTemplate,
    ResponseMode, ResponsePolicy, UserRef,
};
