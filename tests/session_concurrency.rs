use async_trait::async_trait;
use chrono_tz::Tz;
use eventbotti::components::event_session::gateway::CalendarGateway;
use eventbotti::components::event_session::{
    AuthoringProtocol, CalendarEvent, DraftEvent, PersistedEvent, SessionRegistry,
};
use eventbotti::error::{commit_failed, BotResult, Error};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

/// Gateway stub for concurrency tests; nothing here should reach the
/// remote store
struct NullGateway;

#[async_trait]
impl CalendarGateway for NullGateway {
    async fn create_event(&self, draft: &DraftEvent) -> BotResult<PersistedEvent> {
        Ok(PersistedEvent {
            event_id: "created".to_string(),
            calendar_id: draft.calendar_id.clone(),
            summary: draft.summary.clone().ok_or(Error::MissingRequiredFields)?,
            description: draft.description.clone(),
            start_time: draft.start_time.ok_or(Error::MissingRequiredFields)?,
            end_time: draft.end_time.ok_or(Error::MissingRequiredFields)?,
            color: draft.color,
        })
    }

    async fn get_event(&self, _calendar_id: &str, _event_id: &str) -> BotResult<Option<CalendarEvent>> {
        Ok(None)
    }

    async fn delete_event(&self, _calendar_id: &str, _event_id: &str) -> BotResult<()> {
        Ok(())
    }
}

/// Gateway that parks inside delete_event until released, so tests can
/// overlap other protocol calls with an in-flight delete
#[derive(Default)]
struct ParkedDeleteGateway {
    entered: Notify,
    release: Notify,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl CalendarGateway for ParkedDeleteGateway {
    async fn create_event(&self, _draft: &DraftEvent) -> BotResult<PersistedEvent> {
        Err(commit_failed("not expected in this test"))
    }

    async fn get_event(&self, _calendar_id: &str, _event_id: &str) -> BotResult<Option<CalendarEvent>> {
        Ok(None)
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> BotResult<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

fn tz() -> Tz {
    "UTC".parse().unwrap()
}

fn protocol() -> Arc<AuthoringProtocol> {
    Arc::new(AuthoringProtocol::new(SessionRegistry::new(), Arc::new(NullGateway)))
}

/// Two concurrent summary writes for the same guild: the draft ends up
/// holding exactly one of the two values, and neither caller panics
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_summary_writes() {
    let protocol = protocol();
    protocol.start(1, "cal".to_string(), tz()).await.unwrap();

    let a = {
        let protocol = Arc::clone(&protocol);
        tokio::spawn(async move { protocol.set_summary(1, "First value").await })
    };
    let b = {
        let protocol = Arc::clone(&protocol);
        tokio::spawn(async move { protocol.set_summary(1, "Second value").await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let summary = protocol.snapshot(1).await.unwrap().summary.unwrap();
    assert!(summary == "First value" || summary == "Second value");
}

/// A storm of interleaved field writes still leaves a coherent draft:
/// every field holds a value that some single call wrote
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_field_writes() {
    let protocol = protocol();
    protocol.start(1, "cal".to_string(), tz()).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let protocol = Arc::clone(&protocol);
        tasks.push(tokio::spawn(async move {
            match i % 4 {
                0 => protocol.set_summary(1, &format!("summary {}", i)).await.map(|_| ()),
                1 => protocol.set_description(1, &format!("description {}", i)).await.map(|_| ()),
                2 => protocol.set_start(1, "2099/01/10-09:00:00").await.map(|_| ()),
                _ => protocol.set_end(1, "2099/01/10-10:00:00").await.map(|_| ()),
            }
        }));
    }

    for task in tasks {
        // set_start/set_end can legitimately fail ordering checks depending
        // on interleaving; what must not happen is a panic or a poisoned
        // session
        let _ = task.await.unwrap();
    }

    let draft = protocol.snapshot(1).await.unwrap();
    assert!(draft.summary.unwrap().starts_with("summary "));
    assert!(draft.description.unwrap().starts_with("description "));
}

/// A cancel racing a field write never leaves a ghost draft behind
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_races_write() {
    for _ in 0..32 {
        let protocol = protocol();
        protocol.start(1, "cal".to_string(), tz()).await.unwrap();

        let writer = {
            let protocol = Arc::clone(&protocol);
            tokio::spawn(async move { protocol.set_summary(1, "late write").await })
        };
        let canceller = {
            let protocol = Arc::clone(&protocol);
            tokio::spawn(async move { protocol.cancel(1).await })
        };

        // The write either landed before the cancel or was refused after
        // it; both are fine, panics and ghost sessions are not
        let _ = writer.await.unwrap();
        canceller.await.unwrap().unwrap();

        assert!(!protocol.has_active(1).await);
    }
}

/// Sessions for different guilds run fully independently
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_guilds_do_not_interfere() {
    let protocol = protocol();

    let mut tasks = Vec::new();
    for guild_id in 1..=8u64 {
        let protocol = Arc::clone(&protocol);
        tasks.push(tokio::spawn(async move {
            protocol.start(guild_id, format!("cal{}", guild_id), tz()).await.unwrap();
            protocol.set_summary(guild_id, &format!("event {}", guild_id)).await.unwrap();
            protocol.set_start(guild_id, "2099/01/10-09:00:00").await.unwrap();
            protocol.set_end(guild_id, "2099/01/10-10:00:00").await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for guild_id in 1..=8u64 {
        let draft = protocol.snapshot(guild_id).await.unwrap();
        assert_eq!(draft.guild_id, guild_id);
        assert_eq!(draft.calendar_id, format!("cal{}", guild_id));
        assert_eq!(draft.summary.as_deref(), Some(format!("event {}", guild_id).as_str()));
        assert!(draft.has_required_values());
    }
}

/// A start racing an in-flight delete waits for the delete instead of
/// opening a draft under it; the delete never completes while a draft is
/// open
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_excludes_concurrent_start() {
    let gateway = Arc::new(ParkedDeleteGateway::default());
    let protocol = Arc::new(AuthoringProtocol::new(
        SessionRegistry::new(),
        Arc::clone(&gateway) as Arc<dyn CalendarGateway>,
    ));

    let delete_task = {
        let protocol = Arc::clone(&protocol);
        tokio::spawn(async move { protocol.delete_existing(1, "cal", "ev1").await })
    };
    gateway.entered.notified().await;

    // The delete is parked holding the guild's slot; a start for the same
    // guild must not land until it finishes
    let mut start_task = {
        let protocol = Arc::clone(&protocol);
        tokio::spawn(async move { protocol.start(1, "cal".to_string(), tz()).await })
    };
    assert!(timeout(Duration::from_millis(50), &mut start_task).await.is_err());

    gateway.release.notify_one();
    delete_task.await.unwrap().unwrap();
    start_task.await.unwrap().unwrap();

    assert!(protocol.has_active(1).await);
    assert_eq!(gateway.deleted.lock().unwrap().as_slice(), ["ev1"]);
}

/// Two racing starts admit exactly one session
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts() {
    for _ in 0..32 {
        let protocol = protocol();

        let a = {
            let protocol = Arc::clone(&protocol);
            tokio::spawn(async move { protocol.start(1, "cal_a".to_string(), tz()).await })
        };
        let b = {
            let protocol = Arc::clone(&protocol);
            tokio::spawn(async move { protocol.start(1, "cal_b".to_string(), tz()).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let already_active = results
            .iter()
            .filter(|r| matches!(r, Err(Error::AlreadyActive)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(already_active, 1);
        assert!(protocol.has_active(1).await);
    }
}
