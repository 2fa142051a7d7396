//! Core data types for poke reactions.
//!
//! - `ReplyTemplate` / `CommandPolicy`: the two kinds of configured response
//! - `ResponsePolicy`: the effective response for a scope (global or group)
//! - `NoticeEvent`: an inbound notice as delivered by the host
//! - `PokeRequest`: an outbound poke handed back to the host

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::config::PolicySettings;
use crate::error::PokeError;

/// Notice subtype the reactor responds to.
pub const POKE_SUBTYPE: &str = "poke";

/// Weight given to a template when the configuration omits one.
pub const DEFAULT_WEIGHT: f64 = 50.0;

/// Trigger probability (percent) for the default command policy.
pub const DEFAULT_PROBABILITY: f64 = 50.0;

/// Command executed by the default command policy.
pub const DEFAULT_COMMAND: &str = "status";

/// Reply sent by the default message policy.
pub const DEFAULT_MESSAGE: &str = "<at id={userId}/> poked you back";

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_probability() -> f64 {
    DEFAULT_PROBABILITY
}

fn default_command() -> String {
    DEFAULT_COMMAND.to_string()
}

/// A candidate reply with a relative selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyTemplate {
    /// Reply content, possibly with `{userId}`-style placeholders
    pub content: String,
    /// Relative weight (0-100)
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl ReplyTemplate {
    /// Create a template with an explicit weight
    pub fn new(content: impl Into<String>, weight: f64) -> Self {
        Self {
            content: content.into(),
            weight,
        }
    }

    /// Weight used for selection. Negative and non-finite weights count as zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

impl Default for ReplyTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE, DEFAULT_WEIGHT)
    }
}

/// A command line run through the host, gated by a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPolicy {
    /// Command line passed to the host executor
    #[serde(default = "default_command")]
    pub content: String,
    /// Chance to run, in percent (0-100)
    #[serde(default = "default_probability")]
    pub probability: f64,
}

impl CommandPolicy {
    /// Create a command policy
    pub fn new(content: impl Into<String>, probability: f64) -> Self {
        Self {
            content: content.into(),
            probability,
        }
    }

    /// Probability used for the roll. Non-finite values count as zero.
    pub fn effective_probability(&self) -> f64 {
        if self.probability.is_finite() {
            self.probability
        } else {
            0.0
        }
    }
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_PROBABILITY)
    }
}

/// Configuration tag selecting the kind of response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(try_from = "String", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseMode {
    /// Run a command through the host
    #[default]
    Command,
    /// Reply with a weighted-random message
    Message,
}

impl ResponseMode {
    /// Parse a mode tag, rejecting anything but `command` and `message`.
    pub fn parse(tag: &str) -> Result<Self, PokeError> {
        tag.trim()
            .to_lowercase()
            .parse()
            .map_err(|_| PokeError::invalid_policy(tag))
    }
}

impl TryFrom<String> for ResponseMode {
    type Error = PokeError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Self::parse(&tag)
    }
}

/// Effective response behavior for a scope.
///
/// Deserializes from the flat `mode` / `command` / `messages` option layout;
/// only the branch selected by `mode` is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolicySettings", into = "PolicySettings")]
pub enum ResponsePolicy {
    /// Execute a command with some probability
    Command(CommandPolicy),
    /// Send one of the templates, chosen by weight
    Message(Vec<ReplyTemplate>),
}

impl ResponsePolicy {
    /// Command policy shorthand
    pub fn command(content: impl Into<String>, probability: f64) -> Self {
        Self::Command(CommandPolicy::new(content, probability))
    }

    /// Message policy shorthand
    pub fn messages(templates: Vec<ReplyTemplate>) -> Self {
        Self::Message(templates)
    }

    /// The configuration tag of this policy
    pub fn mode(&self) -> ResponseMode {
        match self {
            Self::Command(_) => ResponseMode::Command,
            Self::Message(_) => ResponseMode::Message,
        }
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::Command(CommandPolicy::default())
    }
}

/// An inbound notice as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeEvent {
    /// Notice subtype; only `poke` is handled
    pub subtype: String,
    /// Platform the notice arrived on
    pub platform: String,
    /// User who poked
    pub user_id: String,
    /// User who was poked
    pub target_id: String,
    /// The bot's own id on this platform
    pub self_id: String,
    /// Originating group, `None` for direct conversations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    /// Whether the notice came from a direct conversation
    #[serde(default)]
    pub is_direct: bool,
    /// Event time in milliseconds
    pub timestamp: u64,
}

impl NoticeEvent {
    /// A direct-conversation poke on the default platform
    pub fn poke(
        user_id: impl Into<String>,
        target_id: impl Into<String>,
        self_id: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            subtype: POKE_SUBTYPE.to_string(),
            platform: crate::config::DEFAULT_PLATFORM.to_string(),
            user_id: user_id.into(),
            target_id: target_id.into(),
            self_id: self_id.into(),
            guild_id: None,
            is_direct: true,
            timestamp,
        }
    }

    /// Move the notice into a group conversation
    pub fn in_group(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self.is_direct = false;
        self
    }

    /// Set the platform
    pub fn on_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Set the subtype
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    /// Whether this is a poke notice
    pub fn is_poke(&self) -> bool {
        self.subtype == POKE_SUBTYPE
    }

    /// Whether the bot itself was poked
    pub fn targets_self(&self) -> bool {
        self.target_id == self.self_id
    }

    /// Group id, treating an empty id as no group
    pub fn group_id(&self) -> Option<&str> {
        self.guild_id.as_deref().filter(|g| !g.is_empty())
    }
}

/// Conversation kind of an outbound poke.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum PokeKind {
    /// Poke in a direct conversation
    #[strum(serialize = "friend_poke")]
    Direct,
    /// Poke inside a group
    #[strum(serialize = "group_poke")]
    Group,
}

impl PokeKind {
    /// Protocol action name the host should call
    pub fn action(&self) -> &'static str {
        self.into()
    }
}

/// Outbound poke handed to the host's protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokeRequest {
    /// Direct or group poke
    pub kind: PokeKind,
    /// User who invoked the command
    pub actor_id: String,
    /// User to poke
    pub target_id: String,
    /// Group to poke in (group pokes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A `platform:id` user reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    /// Platform name
    pub platform: String,
    /// User id on that platform
    pub id: String,
}

impl UserRef {
    /// Parse `platform:id`. The id may itself contain colons.
    pub fn parse(s: &str) -> Option<Self> {
        let (platform, id) = s.split_once(':')?;
        if platform.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            platform: platform.to_string(),
            id: id.to_string(),
        })
    }
}

/// Context of a `poke [target]` command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Platform the command arrived on
    pub platform: String,
    /// User who invoked the command
    pub user_id: String,
    /// Current group, `None` in direct conversations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    /// Whether the command came from a direct conversation
    #[serde(default)]
    pub is_direct: bool,
}

impl CommandInvocation {
    /// A direct-conversation invocation on the default platform
    pub fn direct(user_id: impl Into<String>) -> Self {
        Self {
            platform: crate::config::DEFAULT_PLATFORM.to_string(),
            user_id: user_id.into(),
            guild_id: None,
            is_direct: true,
        }
    }

    /// A group invocation on the default platform
    pub fn in_group(user_id: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            platform: crate::config::DEFAULT_PLATFORM.to_string(),
            user_id: user_id.into(),
            guild_id: Some(guild_id.into()),
            is_direct: false,
        }
    }

    /// Set the platform
    pub fn on_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }
}
