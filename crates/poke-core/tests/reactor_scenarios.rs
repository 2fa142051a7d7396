//! Integration tests for poke handling.
//!
//! Drives the reactor and initiator through a recording session the way a
//! host would, one notice at a time.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use poke_core::{
    CommandInvocation, CooldownTracker, DispatchAction, NoticeEvent, PokeConfig, PokeError,
    PokeInitiator, PokeKind, PokeReactor, PokeRequest, PokeResult, Reaction, ReplyTemplate,
    ResponsePolicy, Session,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Session that records everything the core asks the host to do.
#[derive(Default)]
struct RecordingSession {
    queued: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
    pokes: Mutex<Vec<PokeRequest>>,
    fail_execute: bool,
}

impl RecordingSession {
    fn failing() -> Self {
        Self {
            fail_execute: true,
            ..Default::default()
        }
    }

    fn queued(&self) -> Vec<String> {
        self.queued.lock().unwrap().clone()
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Session for RecordingSession {
    fn send_queued(&self, content: String) {
        self.queued.lock().unwrap().push(content);
    }

    async fn execute(&self, command: &str) -> PokeResult<()> {
        if self.fail_execute {
            return Err(PokeError::command_failed("executor unavailable"));
        }
        self.executed.lock().unwrap().push(command.to_string());
        Ok(())
    }

    async fn send_poke(&self, request: &PokeRequest) -> PokeResult<()> {
        self.pokes.lock().unwrap().push(request.clone());
        Ok(())
    }
}

fn seeded_reactor() -> PokeReactor {
    PokeReactor::new().with_rng(StdRng::seed_from_u64(42))
}

fn poke_at(user: &str, timestamp: u64) -> NoticeEvent {
    NoticeEvent::poke(user, "bot", "bot", timestamp)
}

/// Status command at 5000, suppressed at 5500 without a warning.
#[tokio::test]
async fn test_status_command_then_silent_cooldown() {
    let config = PokeConfig::builder()
        .cooldown_ms(1000)
        .default_policy(ResponsePolicy::command("status", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    let first = reactor.handle(&config, &poke_at("A", 5000), &session).await.unwrap();
    assert!(first.is_dispatched());
    assert_eq!(session.executed(), vec!["status"]);

    let second = reactor.handle(&config, &poke_at("A", 5500), &session).await.unwrap();
    assert!(second.is_suppressed());
    assert_eq!(session.executed(), vec!["status"]);
    assert!(session.queued().is_empty());
    assert_eq!(reactor.last_trigger("A"), Some(5000));
}

#[tokio::test]
async fn test_cooldown_window_boundary() {
    let config = PokeConfig::builder()
        .cooldown_ms(1000)
        .default_policy(ResponsePolicy::command("status", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    for (t, accepted) in [(0, true), (999, false), (1000, true), (1500, false), (2000, true)] {
        let reaction = reactor.handle(&config, &poke_at("A", t), &session).await.unwrap();
        assert_eq!(reaction.is_dispatched(), accepted, "at t={t}");
    }
    assert_eq!(session.executed().len(), 3);
}

#[tokio::test]
async fn test_cooldown_is_per_user() {
    let config = PokeConfig::builder()
        .default_policy(ResponsePolicy::command("status", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    reactor.handle(&config, &poke_at("A", 100), &session).await.unwrap();
    let other = reactor.handle(&config, &poke_at("B", 200), &session).await.unwrap();

    assert!(other.is_dispatched());
    assert_eq!(reactor.ledger_len(), 2);
}

#[tokio::test]
async fn test_disabled_cooldown_never_suppresses() {
    let config = PokeConfig::builder()
        .cooldown_ms(0)
        .default_policy(ResponsePolicy::command("status", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    for _ in 0..5 {
        let reaction = reactor.handle(&config, &poke_at("A", 42), &session).await.unwrap();
        assert!(reaction.is_dispatched());
    }
    assert_eq!(session.executed().len(), 5);
}

#[tokio::test]
async fn test_warning_sent_while_suppressed() {
    let config = PokeConfig::builder()
        .warn_on_cooldown(true)
        .default_policy(ResponsePolicy::messages(vec![]))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    reactor.handle(&config, &poke_at("A", 0), &session).await.unwrap();
    reactor.handle(&config, &poke_at("A", 10), &session).await.unwrap();

    assert_eq!(session.queued(), vec![config.warning_text.clone()]);
}

#[tokio::test]
async fn test_weighted_replies_follow_weights() {
    let config = PokeConfig::builder()
        .cooldown_ms(0)
        .default_policy(ResponsePolicy::messages(vec![
            ReplyTemplate::new("rare", 10.0),
            ReplyTemplate::new("common", 90.0),
        ]))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    for t in 0..2000 {
        reactor.handle(&config, &poke_at("A", t), &session).await.unwrap();
    }

    let queued = session.queued();
    let rare = queued.iter().filter(|c| c.as_str() == "rare").count();
    assert_eq!(queued.len(), 2000);
    assert!((100..300).contains(&rare), "rare picked {rare} times");
}

#[tokio::test]
async fn test_zero_weights_pick_first_template() {
    let config = PokeConfig::builder()
        .default_policy(ResponsePolicy::messages(vec![
            ReplyTemplate::new("first", 0.0),
            ReplyTemplate::new("second", 0.0),
        ]))
        .build();
    let session = RecordingSession::default();

    let reaction = seeded_reactor()
        .handle(&config, &poke_at("A", 0), &session)
        .await
        .unwrap();

    assert_eq!(
        reaction.action(),
        Some(&DispatchAction::Message {
            content: "first".to_string()
        })
    );
}

#[tokio::test]
async fn test_group_override_precedence() {
    let config = PokeConfig::builder()
        .cooldown_ms(0)
        .default_policy(ResponsePolicy::command("status", 100.0))
        .group_override(
            "g1",
            ResponsePolicy::messages(vec![ReplyTemplate::new("hello {guildId}", 50.0)]),
        )
        .group_override("g1", ResponsePolicy::command("shadowed", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::default();

    reactor
        .handle(&config, &poke_at("A", 0).in_group("g1"), &session)
        .await
        .unwrap();
    reactor
        .handle(&config, &poke_at("A", 1).in_group("g2"), &session)
        .await
        .unwrap();

    assert_eq!(session.queued(), vec!["hello g1"]);
    assert_eq!(session.executed(), vec!["status"]);
}

#[tokio::test]
async fn test_failed_command_still_consumes_cooldown() {
    let config = PokeConfig::builder()
        .default_policy(ResponsePolicy::command("status", 100.0))
        .build();
    let reactor = seeded_reactor();
    let session = RecordingSession::failing();

    let err = reactor
        .handle(&config, &poke_at("A", 0), &session)
        .await
        .unwrap_err();
    assert!(err.is_downstream());

    let retry = reactor.handle(&config, &poke_at("A", 10), &session).await.unwrap();
    assert!(retry.is_suppressed());
}

#[tokio::test]
async fn test_concurrent_pokes_charge_once() {
    let config = Arc::new(
        PokeConfig::builder()
            .default_policy(ResponsePolicy::command("status", 100.0))
            .build(),
    );
    let reactor = Arc::new(seeded_reactor());
    let session = Arc::new(RecordingSession::default());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let (config, reactor, session) = (config.clone(), reactor.clone(), session.clone());
        handles.push(tokio::spawn(async move {
            reactor
                .handle(&config, &poke_at("A", 7000), session.as_ref())
                .await
                .unwrap()
        }));
    }

    let mut dispatched = 0;
    for handle in handles {
        if handle.await.unwrap().is_dispatched() {
            dispatched += 1;
        }
    }
    assert_eq!(dispatched, 1);
    assert_eq!(session.executed().len(), 1);
}

#[tokio::test]
async fn test_injected_ledger_is_honored() {
    let mut tracker = CooldownTracker::new();
    tracker.record("A", 9_800);
    let reactor = PokeReactor::with_tracker(tracker);
    let config = PokeConfig::default();
    let session = RecordingSession::default();

    let reaction = reactor.handle(&config, &poke_at("A", 10_000), &session).await.unwrap();
    assert!(matches!(
        reaction,
        Reaction::Suppressed { remaining_ms: 800, .. }
    ));
}

#[tokio::test]
async fn test_initiator_round_trip() {
    let config = PokeConfig::default();
    let initiator = PokeInitiator::from_config(&config);
    let session = RecordingSession::default();

    initiator
        .poke(&CommandInvocation::direct("A"), None, &session)
        .await
        .unwrap();
    initiator
        .poke(&CommandInvocation::in_group("A", "g1"), Some("onebot:B"), &session)
        .await
        .unwrap();
    let skipped = initiator
        .poke(&CommandInvocation::in_group("A", "g1"), Some("telegram:B"), &session)
        .await
        .unwrap();
    assert!(skipped.is_none());

    let pokes = session.pokes.lock().unwrap().clone();
    assert_eq!(pokes.len(), 2);
    assert_eq!(pokes[0].kind, PokeKind::Direct);
    assert_eq!(pokes[0].target_id, "A");
    assert_eq!(pokes[1].kind.action(), "group_poke");
    assert_eq!(pokes[1].group_id.as_deref(), Some("g1"));
}
