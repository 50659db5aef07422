use super::colors::EventColor;
use super::draft::DraftEvent;
use super::gateway::CalendarGateway;
use super::models::{CalendarEvent, PersistedEvent};
use super::registry::SessionRegistry;
use super::validators;
use crate::error::{BotResult, Error};
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, info};

/// The authoring state machine for per-guild event drafts.
///
/// Every mutation acquires the guild's session slot, validates against the
/// current draft, then mutates, so concurrent commands for the same guild
/// serialize instead of interleaving. The slot is held across a remote call
/// only for `confirm` and `delete_existing`, whose single remote requests
/// must not race a concurrent start or cancel.
pub struct AuthoringProtocol {
    registry: SessionRegistry,
    gateway: Arc<dyn CalendarGateway>,
}

impl AuthoringProtocol {
    pub fn new(registry: SessionRegistry, gateway: Arc<dyn CalendarGateway>) -> Self {
        Self { registry, gateway }
    }

    /// Whether the guild is currently drafting
    pub async fn has_active(&self, guild_id: u64) -> bool {
        self.registry.has_active(guild_id).await
    }

    /// Non-mutating snapshot of the guild's draft for view/review
    pub async fn snapshot(&self, guild_id: u64) -> BotResult<DraftEvent> {
        self.registry.get(guild_id).await.ok_or(Error::NoActiveSession)
    }

    /// Start a fresh authoring session for the guild
    pub async fn start(&self, guild_id: u64, calendar_id: String, timezone: Tz) -> BotResult<DraftEvent> {
        let draft = DraftEvent::new(guild_id, calendar_id, timezone);
        self.registry.begin(guild_id, draft.clone()).await?;
        info!(guild_id, "Event authoring session started");
        Ok(draft)
    }

    /// Start a session seeded from an existing calendar event. Summary,
    /// description, color and zone are copied; times must be given anew.
    pub async fn start_from_existing(
        &self,
        guild_id: u64,
        calendar_id: String,
        fallback_timezone: Tz,
        event_id: &str,
    ) -> BotResult<DraftEvent> {
        // The lookup happens before a session exists, so it is not under
        // any slot lock; begin() still rejects a racing second start.
        let source = self
            .gateway
            .get_event(&calendar_id, event_id)
            .await?
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))?;

        let draft = DraftEvent::from_existing(guild_id, calendar_id, fallback_timezone, &source);
        self.registry.begin(guild_id, draft.clone()).await?;
        info!(guild_id, source_event_id = event_id, "Event authoring session started from copy");
        Ok(draft)
    }

    /// Set the draft's summary, overwriting any prior value
    pub async fn set_summary(&self, guild_id: u64, text: &str) -> BotResult<DraftEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_mut().ok_or(Error::NoActiveSession)?;
        draft.summary = Some(collapse(text));
        Ok(draft.clone())
    }

    /// Set the draft's description, overwriting any prior value
    pub async fn set_description(&self, guild_id: u64, text: &str) -> BotResult<DraftEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_mut().ok_or(Error::NoActiveSession)?;
        draft.description = Some(collapse(text));
        Ok(draft.clone())
    }

    /// Set the draft's start from raw `yyyy/MM/dd-HH:mm:ss` text. The draft
    /// is left untouched unless every check passes.
    pub async fn set_start(&self, guild_id: u64, raw: &str) -> BotResult<DraftEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_mut().ok_or(Error::NoActiveSession)?;

        let candidate = parse_candidate(raw, draft.timezone)?;
        if validators::start_after_end(candidate, draft) {
            return Err(Error::OrderingViolation);
        }

        draft.set_start_time(candidate);
        debug!(guild_id, start = %candidate, "Draft start time set");
        Ok(draft.clone())
    }

    /// Set the draft's end from raw `yyyy/MM/dd-HH:mm:ss` text. The draft
    /// is left untouched unless every check passes.
    pub async fn set_end(&self, guild_id: u64, raw: &str) -> BotResult<DraftEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_mut().ok_or(Error::NoActiveSession)?;

        let candidate = parse_candidate(raw, draft.timezone)?;
        if validators::end_before_start(candidate, draft) {
            return Err(Error::OrderingViolation);
        }

        draft.set_end_time(candidate);
        debug!(guild_id, end = %candidate, "Draft end time set");
        Ok(draft.clone())
    }

    /// Set the draft's color from a name, hex value or numeric ID. The
    /// reserved listing tokens are the caller's business and never accepted
    /// here.
    pub async fn set_color(&self, guild_id: u64, token: &str) -> BotResult<DraftEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_mut().ok_or(Error::NoActiveSession)?;

        let color = EventColor::resolve(token).ok_or_else(|| Error::UnknownColor(token.to_string()))?;
        draft.color = color;
        Ok(draft.clone())
    }

    /// Discard the guild's draft. Fails with `NoActiveSession` if nothing
    /// was being authored.
    pub async fn cancel(&self, guild_id: u64) -> BotResult<()> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        if guard.is_none() {
            return Err(Error::NoActiveSession);
        }
        *guard = None;
        info!(guild_id, "Event authoring session cancelled");
        Ok(())
    }

    /// Commit the draft: check the readiness gate, issue the single remote
    /// create call, and clear the session on success. On gateway failure
    /// the draft is left intact so the same confirm can be retried.
    pub async fn confirm(&self, guild_id: u64) -> BotResult<PersistedEvent> {
        let slot = self.registry.slot(guild_id).await;
        let mut guard = slot.lock().await;
        let draft = guard.as_ref().ok_or(Error::NoActiveSession)?;

        if !draft.has_required_values() {
            return Err(Error::MissingRequiredFields);
        }

        let persisted = self.gateway.create_event(draft).await?;
        *guard = None;
        info!(guild_id, event_id = %persisted.event_id, "Event committed to calendar");
        Ok(persisted)
    }

    /// Delete a persisted event. Refused while a draft is open for the
    /// guild, since the draft may itself be a copy of that event. The slot
    /// stays held across the remote call so a racing start waits rather
    /// than opening a draft under an in-flight delete.
    pub async fn delete_existing(&self, guild_id: u64, calendar_id: &str, event_id: &str) -> BotResult<()> {
        let slot = self.registry.slot(guild_id).await;
        let guard = slot.lock().await;
        if guard.is_some() {
            return Err(Error::SessionActive);
        }
        self.gateway.delete_event(calendar_id, event_id).await?;
        info!(guild_id, event_id, "Calendar event deleted");
        Ok(())
    }

    /// Fetch an existing event for display. No session interaction.
    pub async fn lookup_existing(&self, calendar_id: &str, event_id: &str) -> BotResult<CalendarEvent> {
        self.gateway
            .get_event(calendar_id, event_id)
            .await?
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))
    }
}

/// Shared validation pipeline for raw start/end input: cheap length
/// pre-filter, strict parse in the draft's zone, then the past check
fn parse_candidate(raw: &str, timezone: Tz) -> BotResult<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.len() < validators::MIN_RAW_LENGTH {
        return Err(Error::MalformedDateTime(raw.to_string()));
    }

    let candidate = validators::parse_datetime(raw, timezone)?;
    if validators::in_past(candidate) {
        return Err(Error::TimeInPast);
    }

    Ok(candidate)
}

/// Collapse free text to a single trimmed, single-spaced string
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
