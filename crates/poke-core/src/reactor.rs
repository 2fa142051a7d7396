//! Inbound poke handling.
//!
//! A notice moves through filter → cooldown → resolve → dispatch:
//! 1. Non-poke notices, other platforms, and (with self-only filtering)
//!    pokes aimed at someone else are ignored without touching the ledger
//! 2. The cooldown is checked and, if accepted, recorded in one critical
//!    section with no await inside
//! 3. The group's policy is resolved
//! 4. Command policies roll against their probability; message policies
//!    pick a template by weight and queue it

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::chooser;
use crate::config::PokeConfig;
use crate::cooldown::{CooldownDecision, CooldownTracker};
use crate::error::PokeResult;
use crate::events::ReactionBus;
use crate::reaction::{DispatchAction, IgnoreReason, Reaction};
use crate::session::Session;
use crate::types::{NoticeEvent, ResponsePolicy};

/// Reacts to inbound poke notices.
///
/// Owns its cooldown ledger, so independent reactors never share state.
/// Safe to share between tasks behind an `Arc`.
pub struct PokeReactor {
    tracker: Mutex<CooldownTracker>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    events: Option<ReactionBus>,
}

impl PokeReactor {
    /// Create a reactor with an empty ledger and the OS-seeded generator.
    pub fn new() -> Self {
        Self::with_tracker(CooldownTracker::new())
    }

    /// Create a reactor around an existing ledger.
    pub fn with_tracker(tracker: CooldownTracker) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            events: None,
        }
    }

    /// Use a specific random generator for probability rolls and picks.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    /// Publish every handled notice on `bus`.
    pub fn with_event_bus(mut self, bus: ReactionBus) -> Self {
        self.events = Some(bus);
        self
    }

    fn tracker(&self) -> MutexGuard<'_, CooldownTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RngCore + Send>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one inbound notice.
    ///
    /// Expected mismatches return `Ok` with an ignored reaction. Errors only
    /// come from the host's command executor; the cooldown entry recorded
    /// before the call is kept.
    pub async fn handle(
        &self,
        config: &PokeConfig,
        event: &NoticeEvent,
        session: &dyn Session,
    ) -> PokeResult<Reaction> {
        if let Some(reason) = Self::filter(config, event) {
            debug!(
                user_id = %event.user_id,
                subtype = %event.subtype,
                reason = ?reason,
                "Ignoring notice"
            );
            return Ok(self.finish(event, Reaction::ignored(reason)));
        }

        // Check and record under one guard; the guard is dropped before any await.
        let decision =
            self.tracker()
                .check_and_record(&event.user_id, event.timestamp, config.cooldown_ms);

        if let CooldownDecision::Suppressed { remaining_ms } = decision {
            debug!(
                user_id = %event.user_id,
                remaining_ms,
                warn = config.warn_on_cooldown,
                "Poke suppressed by cooldown"
            );
            if config.warn_on_cooldown {
                session.send_queued(config.warning_text.clone());
            }
            return Ok(self.finish(
                event,
                Reaction::Suppressed {
                    user_id: event.user_id.clone(),
                    remaining_ms,
                    warned: config.warn_on_cooldown,
                },
            ));
        }

        let policy = config.resolve(event.group_id());
        let action = self.dispatch(policy, event, session).await?;

        info!(
            user_id = %event.user_id,
            group_id = ?event.group_id(),
            mode = %policy.mode(),
            sent = action.is_sent(),
            "Poke handled"
        );

        Ok(self.finish(
            event,
            Reaction::Dispatched {
                user_id: event.user_id.clone(),
                group_id: event.group_id().map(str::to_string),
                action,
            },
        ))
    }

    fn filter(config: &PokeConfig, event: &NoticeEvent) -> Option<IgnoreReason> {
        if !event.is_poke() {
            Some(IgnoreReason::NotPoke)
        } else if event.platform != config.platform {
            Some(IgnoreReason::ForeignPlatform)
        } else if config.filter_self_only && !event.targets_self() {
            Some(IgnoreReason::NotSelfTarget)
        } else {
            None
        }
    }

    async fn dispatch(
        &self,
        policy: &ResponsePolicy,
        event: &NoticeEvent,
        session: &dyn Session,
    ) -> PokeResult<DispatchAction> {
        match policy {
            ResponsePolicy::Command(command) => {
                let probability = command.effective_probability();
                let roll = chooser::roll_percent_with_rng(&mut *self.rng());
                if roll >= probability {
                    return Ok(DispatchAction::ProbabilityMiss { roll, probability });
                }

                if let Err(e) = session.execute(&command.content).await {
                    warn!(
                        user_id = %event.user_id,
                        command = %command.content,
                        error = %e,
                        "Poke command failed"
                    );
                    return Err(e);
                }

                Ok(DispatchAction::Command {
                    content: command.content.clone(),
                })
            }
            ResponsePolicy::Message(templates) => {
                if templates.is_empty() {
                    return Ok(DispatchAction::NoTemplates);
                }

                let template = chooser::pick_with_rng(&mut *self.rng(), templates)?;
                let content = session.render(&template.content, event);
                session.send_queued(content.clone());

                Ok(DispatchAction::Message { content })
            }
        }
    }

    fn finish(&self, event: &NoticeEvent, reaction: Reaction) -> Reaction {
        if let Some(bus) = &self.events {
            bus.publish(event, &reaction);
        }
        reaction
    }

    /// Timestamp of a user's last accepted poke.
    pub fn last_trigger(&self, user_id: &str) -> Option<u64> {
        self.tracker().last_trigger(user_id)
    }

    /// Number of users in the cooldown ledger.
    pub fn ledger_len(&self) -> usize {
        self.tracker().len()
    }

    /// Drop ledger entries older than `factor` cooldown windows.
    ///
    /// Never called automatically; hosts that run for a long time can call
    /// it periodically to bound the ledger. A zero cooldown clears it.
    pub fn sweep_ledger(&self, now: u64, cooldown_ms: u64, factor: u64) -> usize {
        let removed = self
            .tracker()
            .sweep(now, cooldown_ms.saturating_mul(factor.max(1)));
        if removed > 0 {
            debug!(removed, "Swept cooldown ledger");
        }
        removed
    }
}

impl Default for PokeReactor {
    fn default() -> Self {
        Self::new()
    }
}
