//! Host capability interface.
//!
//! The host hands one `Session` per inbound notice or command invocation.
//! Hosts may override `render` to apply their own placeholder syntax.

use async_trait::async_trait;

use crate::error::PokeResult;
use crate::types::{NoticeEvent, PokeRequest};

/// Operations the core needs from the chat-bot host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    /// Queue a message to the current conversation. Fire-and-forget.
    fn send_queued(&self, content: String);

    /// Run a command line in the current conversation.
    async fn execute(&self, command: &str) -> PokeResult<()>;

    /// Forward an outbound poke to the protocol layer.
    async fn send_poke(&self, request: &PokeRequest) -> PokeResult<()>;

    /// Render a reply template against the triggering notice.
    fn render(&self, template: &str, event: &NoticeEvent) -> String {
        render_placeholders(template, event)
    }
}

/// Substitute `{userId}`, `{targetId}`, `{selfId}`, `{guildId}` and
/// `{platform}` with values from the notice. Unknown placeholders are kept.
pub fn render_placeholders(template: &str, event: &NoticeEvent) -> String {
    template
        .replace("{userId}", &event.user_id)
        .replace("{targetId}", &event.target_id)
        .replace("{selfId}", &event.self_id)
        .replace("{guildId}", event.guild_id.as_deref().unwrap_or_default())
        .replace("{platform}", &event.platform)
}
