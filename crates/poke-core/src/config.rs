//! Configuration system for poke reactions.
//!
//! Field names follow Rust conventions; the option names used by existing
//! bot configurations (`filter`, `interval`, `warning`, `prompt`,
//! `groupConfigs`, `guildId`) are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{PokeError, PokeResult};
use crate::types::{CommandPolicy, ReplyTemplate, ResponseMode, ResponsePolicy};

/// Platform the reactor listens on unless configured otherwise.
pub const DEFAULT_PLATFORM: &str = "onebot";

/// Minimum interval between two accepted pokes from one user.
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;

/// Warning sent to a user who pokes during their cooldown.
pub const DEFAULT_WARNING_TEXT: &str = "Stop poking me, take a break.";

/// Flat `mode` / `command` / `messages` layout of a policy in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Which branch is active
    pub mode: ResponseMode,
    /// Settings for command mode
    pub command: CommandPolicy,
    /// Settings for message mode
    pub messages: Vec<ReplyTemplate>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            mode: ResponseMode::default(),
            command: CommandPolicy::default(),
            messages: vec![ReplyTemplate::default()],
        }
    }
}

impl From<PolicySettings> for ResponsePolicy {
    fn from(settings: PolicySettings) -> Self {
        match settings.mode {
            ResponseMode::Command => ResponsePolicy::Command(settings.command),
            ResponseMode::Message => ResponsePolicy::Message(settings.messages),
        }
    }
}

impl From<ResponsePolicy> for PolicySettings {
    fn from(policy: ResponsePolicy) -> Self {
        match policy {
            ResponsePolicy::Command(command) => Self {
                mode: ResponseMode::Command,
                command,
                ..Default::default()
            },
            ResponsePolicy::Message(messages) => Self {
                mode: ResponseMode::Message,
                messages,
                ..Default::default()
            },
        }
    }
}

/// Group-scoped policy that takes precedence over the default policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOverride {
    /// Group this override applies to
    #[serde(alias = "guildId")]
    pub group_id: String,
    /// Policy for that group
    #[serde(flatten)]
    pub policy: ResponsePolicy,
}

impl GroupOverride {
    /// Create a group override
    pub fn new(group_id: impl Into<String>, policy: ResponsePolicy) -> Self {
        Self {
            group_id: group_id.into(),
            policy,
        }
    }
}

/// Main poke configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PokeConfig {
    /// Only react to pokes aimed at the bot itself.
    #[serde(alias = "filter")]
    pub filter_self_only: bool,
    /// Per-user cooldown in milliseconds (0 disables it).
    #[serde(alias = "interval", deserialize_with = "non_negative_ms")]
    pub cooldown_ms: u64,
    /// Send `warning_text` when a poke is suppressed by the cooldown.
    #[serde(alias = "warning")]
    pub warn_on_cooldown: bool,
    /// Warning content.
    #[serde(alias = "prompt")]
    pub warning_text: String,
    /// Policy used when no group override matches.
    #[serde(flatten)]
    pub default_policy: ResponsePolicy,
    /// Group-specific policies, first match wins.
    #[serde(alias = "groupConfigs")]
    pub group_overrides: Vec<GroupOverride>,
    /// Platform whose notices and commands are handled.
    pub platform: String,
}

impl Default for PokeConfig {
    fn default() -> Self {
        Self {
            filter_self_only: true,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            warn_on_cooldown: false,
            warning_text: DEFAULT_WARNING_TEXT.to_string(),
            default_policy: ResponsePolicy::default(),
            group_overrides: Vec::new(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

/// Negative intervals mean "no cooldown".
fn non_negative_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_ms)
}

/// Whole milliseconds from a numeric interval; negative and NaN become 0.
fn clamp_ms(ms: f64) -> u64 {
    if ms.is_nan() || ms <= 0.0 {
        0
    } else {
        // `as` saturates at u64::MAX
        ms as u64
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl PokeConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PokeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| PokeError::configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| PokeError::configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| PokeError::configuration(e.to_string()))?,
            _ => {
                return Err(PokeError::configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml",
                ))
            }
        };

        debug!(
            path = %path.display(),
            mode = %config.default_policy.mode(),
            overrides = config.group_overrides.len(),
            "Loaded poke configuration"
        );
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides.
    ///
    /// Reads:
    /// - `POKE_FILTER_SELF_ONLY` (bool)
    /// - `POKE_COOLDOWN_MS` (integer, negative disables the cooldown)
    /// - `POKE_WARN_ON_COOLDOWN` (bool)
    /// - `POKE_WARNING_TEXT`
    /// - `POKE_MODE` (`command` or `message`)
    /// - `POKE_PLATFORM`
    ///
    /// Unparsable values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("POKE_FILTER_SELF_ONLY") {
            match parse_bool(&value) {
                Some(filter) => self.filter_self_only = filter,
                None => warn!(value = %value, "Ignoring invalid POKE_FILTER_SELF_ONLY"),
            }
        }

        if let Ok(value) = std::env::var("POKE_COOLDOWN_MS") {
            match value.trim().parse::<f64>() {
                Ok(ms) => self.cooldown_ms = clamp_ms(ms),
                Err(_) => warn!(value = %value, "Ignoring invalid POKE_COOLDOWN_MS"),
            }
        }

        if let Ok(value) = std::env::var("POKE_WARN_ON_COOLDOWN") {
            match parse_bool(&value) {
                Some(warn_on) => self.warn_on_cooldown = warn_on,
                None => warn!(value = %value, "Ignoring invalid POKE_WARN_ON_COOLDOWN"),
            }
        }

        if let Ok(text) = std::env::var("POKE_WARNING_TEXT") {
            self.warning_text = text;
        }

        if let Ok(value) = std::env::var("POKE_MODE") {
            match ResponseMode::parse(&value) {
                Ok(mode) => self.set_default_mode(mode),
                Err(e) => warn!(error = %e, "Ignoring invalid POKE_MODE"),
            }
        }

        if let Ok(platform) = std::env::var("POKE_PLATFORM") {
            if !platform.is_empty() {
                self.platform = platform;
            }
        }

        self
    }

    /// Switch the default policy's mode. A branch that was not configured
    /// starts from its defaults.
    fn set_default_mode(&mut self, mode: ResponseMode) {
        if self.default_policy.mode() == mode {
            return;
        }
        let mut settings = PolicySettings::from(std::mem::take(&mut self.default_policy));
        settings.mode = mode;
        self.default_policy = settings.into();
    }

    /// Effective policy for a group.
    ///
    /// The first override whose `group_id` matches wins; a missing or empty
    /// group id, or a group without an override, gets the default policy.
    pub fn resolve(&self, group_id: Option<&str>) -> &ResponsePolicy {
        group_id
            .filter(|g| !g.is_empty())
            .and_then(|g| self.group_overrides.iter().find(|o| o.group_id == g))
            .map(|o| &o.policy)
            .unwrap_or(&self.default_policy)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> PokeConfigBuilder {
        PokeConfigBuilder::default()
    }
}

/// Builder for PokeConfig.
#[derive(Default)]
pub struct PokeConfigBuilder {
    config: PokeConfig,
}

impl PokeConfigBuilder {
    /// Only react to pokes aimed at the bot.
    pub fn filter_self_only(mut self, filter: bool) -> Self {
        self.config.filter_self_only = filter;
        self
    }

    /// Set the per-user cooldown.
    pub fn cooldown_ms(mut self, ms: u64) -> Self {
        self.config.cooldown_ms = ms;
        self
    }

    /// Enable or disable the cooldown warning.
    pub fn warn_on_cooldown(mut self, warn_on: bool) -> Self {
        self.config.warn_on_cooldown = warn_on;
        self
    }

    /// Set the cooldown warning text.
    pub fn warning_text(mut self, text: impl Into<String>) -> Self {
        self.config.warning_text = text.into();
        self
    }

    /// Set the default policy.
    pub fn default_policy(mut self, policy: ResponsePolicy) -> Self {
        self.config.default_policy = policy;
        self
    }

    /// Append a group override.
    pub fn group_override(mut self, group_id: impl Into<String>, policy: ResponsePolicy) -> Self {
        self.config
            .group_overrides
            .push(GroupOverride::new(group_id, policy));
        self
    }

    /// Set the platform.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PokeConfig {
        self.config
    }
}
