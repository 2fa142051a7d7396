//! Outbound pokes issued by the `poke [target]` command.

use tracing::{debug, info};

use crate::config::PokeConfig;
use crate::error::PokeResult;
use crate::session::Session;
use crate::types::{CommandInvocation, PokeKind, PokeRequest, UserRef};

/// Builds and forwards outbound poke requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokeInitiator {
    platform: String,
}

impl PokeInitiator {
    /// Command name registered with the host
    pub const COMMAND: &'static str = "poke";

    /// Initiator serving `platform`.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    /// Initiator serving the configured platform.
    pub fn from_config(config: &PokeConfig) -> Self {
        Self::new(config.platform.clone())
    }

    /// Platform this initiator serves
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Resolve the target and conversation kind of a poke command.
    ///
    /// Returns `None` when the invocation or the target belongs to another
    /// platform, when the target reference cannot be parsed, or when a group
    /// invocation carries no group id.
    pub fn build_request(
        &self,
        invocation: &CommandInvocation,
        target: Option<&str>,
    ) -> Option<PokeRequest> {
        if invocation.platform != self.platform {
            debug!(platform = %invocation.platform, "Poke command from another platform");
            return None;
        }

        let target_id = match target {
            Some(raw) => {
                let Some(user) = UserRef::parse(raw) else {
                    debug!(target_ref = raw, "Unparsable poke target");
                    return None;
                };
                if user.platform != self.platform {
                    debug!(target_ref = raw, "Poke target on another platform");
                    return None;
                }
                user.id
            }
            None => invocation.user_id.clone(),
        };

        if invocation.is_direct {
            return Some(PokeRequest {
                kind: PokeKind::Direct,
                actor_id: invocation.user_id.clone(),
                target_id,
                group_id: None,
            });
        }

        let group_id = invocation.guild_id.as_deref().filter(|g| !g.is_empty())?;
        Some(PokeRequest {
            kind: PokeKind::Group,
            actor_id: invocation.user_id.clone(),
            target_id,
            group_id: Some(group_id.to_string()),
        })
    }

    /// Handle a poke command: build the request and forward it to the host.
    pub async fn poke(
        &self,
        invocation: &CommandInvocation,
        target: Option<&str>,
        session: &dyn Session,
    ) -> PokeResult<Option<PokeRequest>> {
        let Some(request) = self.build_request(invocation, target) else {
            return Ok(None);
        };

        session.send_poke(&request).await?;

        info!(
            action = request.kind.action(),
            actor_id = %request.actor_id,
            target_id = %request.target_id,
            group_id = ?request.group_id,
            "Poke sent"
        );
        Ok(Some(request))
    }
}

impl Default for PokeInitiator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PLATFORM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PokeError;
    use crate::session::MockSession;

    #[test]
    fn test_direct_poke_defaults_to_invoker() {
        let request = PokeInitiator::default()
            .build_request(&CommandInvocation::direct("u1"), None)
            .unwrap();

        assert_eq!(request.kind, PokeKind::Direct);
        assert_eq!(request.actor_id, "u1");
        assert_eq!(request.target_id, "u1");
        assert!(request.group_id.is_none());
    }

    #[test]
    fn test_group_poke_with_target() {
        let request = PokeInitiator::default()
            .build_request(&CommandInvocation::in_group("u1", "g1"), Some("onebot:u2"))
            .unwrap();

        assert_eq!(request.kind, PokeKind::Group);
        assert_eq!(request.target_id, "u2");
        assert_eq!(request.group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_platform_mismatch_is_ignored() {
        let initiator = PokeInitiator::default();

        let foreign = CommandInvocation::direct("u1").on_platform("discord");
        assert!(initiator.build_request(&foreign, None).is_none());

        let local = CommandInvocation::direct("u1");
        assert!(initiator.build_request(&local, Some("discord:u2")).is_none());
        assert!(initiator.build_request(&local, Some("u2")).is_none());
    }

    #[test]
    fn test_group_without_id_is_ignored() {
        let mut invocation = CommandInvocation::in_group("u1", "");
        assert!(PokeInitiator::default().build_request(&invocation, None).is_none());

        invocation.guild_id = None;
        assert!(PokeInitiator::default().build_request(&invocation, None).is_none());
    }

    #[tokio::test]
    async fn test_poke_forwards_request() {
        let mut session = MockSession::new();
        session
            .expect_send_poke()
            .withf(|req| req.kind == PokeKind::Group && req.target_id == "u2")
            .times(1)
            .returning(|_| Ok(()));

        let sent = PokeInitiator::default()
            .poke(&CommandInvocation::in_group("u1", "g1"), Some("onebot:u2"), &session)
            .await
            .unwrap();
        assert!(sent.is_some());
    }

    #[tokio::test]
    async fn test_poke_skips_session_on_mismatch() {
        let mut session = MockSession::new();
        session.expect_send_poke().never();

        let sent = PokeInitiator::new("discord")
            .poke(&CommandInvocation::direct("u1"), None, &session)
            .await
            .unwrap();
        assert!(sent.is_none());
    }

    #[tokio::test]
    async fn test_poke_propagates_host_failure() {
        let mut session = MockSession::new();
        session
            .expect_send_poke()
            .returning(|_| Err(PokeError::poke_failed("adapter rejected")));

        let err = PokeInitiator::default()
            .poke(&CommandInvocation::direct("u1"), None, &session)
            .await
            .unwrap_err();
        assert!(err.is_downstream());
    }
}
