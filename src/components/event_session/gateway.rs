use super::draft::DraftEvent;
use super::models::{CalendarEvent, PersistedEvent};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{commit_failed, remote_lookup_failed, BotResult, Error};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// The single seam to the remote calendar store. Each operation is one
/// atomic remote call; nothing here retries.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Create a persisted event from a validated draft. Exactly one remote
    /// call; any failure maps to `CommitFailed`.
    async fn create_event(&self, draft: &DraftEvent) -> BotResult<PersistedEvent>;

    /// Look up an existing event. `Ok(None)` means the store reports no
    /// such event; remote failures map to `RemoteLookupFailed`.
    async fn get_event(&self, calendar_id: &str, event_id: &str) -> BotResult<Option<CalendarEvent>>;

    /// Delete an existing event. Failures map to `RemoteLookupFailed`.
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> BotResult<()>;
}

/// Gateway implementation backed by the Google Calendar REST API
pub struct GoogleCalendarGateway {
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarGateway {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        let client = Client::new();
        Self {
            token_manager: TokenManager::new(config, client.clone()),
            client,
        }
    }

    fn event_url(calendar_id: &str, event_id: &str) -> BotResult<Url> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| Error::GoogleCalendar(format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::GoogleCalendar("Failed to build URL".to_string()))?
            .push(calendar_id)
            .push("events")
            .push(event_id);
        Ok(url)
    }

    fn events_url(calendar_id: &str) -> BotResult<Url> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| Error::GoogleCalendar(format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::GoogleCalendar("Failed to build URL".to_string()))?
            .push(calendar_id)
            .push("events");
        Ok(url)
    }

    /// Build the create-event payload from the draft's required and
    /// optional fields. Color is omitted when left at `None`.
    fn build_payload(draft: &DraftEvent) -> BotResult<Value> {
        let summary = draft.summary.as_ref().ok_or(Error::MissingRequiredFields)?;
        let start = draft.start_time.ok_or(Error::MissingRequiredFields)?;
        let end = draft.end_time.ok_or(Error::MissingRequiredFields)?;

        let mut payload = json!({
            "summary": summary,
            "start": {
                "dateTime": start.to_rfc3339(),
                "timeZone": draft.timezone.name(),
            },
            "end": {
                "dateTime": end.to_rfc3339(),
                "timeZone": draft.timezone.name(),
            },
        });

        if let Some(description) = &draft.description {
            payload["description"] = json!(description);
        }
        if draft.color != super::colors::EventColor::None {
            payload["colorId"] = json!(draft.color.id().to_string());
        }

        Ok(payload)
    }

    fn parse_event(event: &Value) -> CalendarEvent {
        let id = event.get("id").and_then(|id| id.as_str()).unwrap_or("").to_string();
        let summary = event.get("summary").and_then(|s| s.as_str()).map(|s| s.to_string());
        let description = event.get("description").and_then(|s| s.as_str()).map(|s| s.to_string());
        let color_id = event.get("colorId").and_then(|s| s.as_str()).map(|s| s.to_string());
        let created = event.get("created").and_then(|s| s.as_str()).map(|s| s.to_string());

        let start_date_time = event
            .get("start")
            .and_then(|start| start.get("dateTime"))
            .and_then(|dt| dt.as_str())
            .map(|s| s.to_string());

        let time_zone = event
            .get("start")
            .and_then(|start| start.get("timeZone"))
            .and_then(|tz| tz.as_str())
            .map(|s| s.to_string());

        let end_date_time = event
            .get("end")
            .and_then(|end| end.get("dateTime"))
            .and_then(|dt| dt.as_str())
            .map(|s| s.to_string());

        CalendarEvent {
            id,
            summary,
            description,
            color_id,
            time_zone,
            created,
            start_date_time,
            end_date_time,
        }
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn create_event(&self, draft: &DraftEvent) -> BotResult<PersistedEvent> {
        let payload = Self::build_payload(draft)?;
        let url = Self::events_url(&draft.calendar_id).map_err(|e| commit_failed(&e.to_string()))?;
        let access_token = self
            .token_manager
            .access_token()
            .await
            .map_err(|e| commit_failed(&e.to_string()))?;

        debug!(guild_id = draft.guild_id, calendar_id = %draft.calendar_id, "Creating calendar event");

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| commit_failed(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            warn!("Event creation rejected: HTTP {} - {}", status, error_body);
            return Err(commit_failed(&format!("HTTP {} - {}", status, error_body)));
        }

        let created: Value = response
            .json()
            .await
            .map_err(|e| commit_failed(&format!("Failed to parse create response: {}", e)))?;

        let event_id = created
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| commit_failed("Create response missing event ID"))?
            .to_string();

        // The snapshot comes from the draft we just committed; the store
        // only contributes the identity.
        Ok(PersistedEvent {
            event_id,
            calendar_id: draft.calendar_id.clone(),
            summary: draft.summary.clone().unwrap_or_default(),
            description: draft.description.clone(),
            start_time: draft.start_time.ok_or(Error::MissingRequiredFields)?,
            end_time: draft.end_time.ok_or(Error::MissingRequiredFields)?,
            color: draft.color,
        })
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> BotResult<Option<CalendarEvent>> {
        let url = Self::event_url(calendar_id, event_id).map_err(|e| remote_lookup_failed(&e.to_string()))?;
        let access_token = self
            .token_manager
            .access_token()
            .await
            .map_err(|e| remote_lookup_failed(&e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| remote_lookup_failed(&format!("Failed to fetch event: {}", e)))?;

        // Gone/missing means "no such event", not a transport failure
        if response.status() == StatusCode::NOT_FOUND || response.status() == StatusCode::GONE {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(remote_lookup_failed(&format!("HTTP {} - {}", status, error_body)));
        }

        let event: Value = response
            .json()
            .await
            .map_err(|e| remote_lookup_failed(&format!("Failed to parse event response: {}", e)))?;

        Ok(Some(Self::parse_event(&event)))
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> BotResult<()> {
        let url = Self::event_url(calendar_id, event_id).map_err(|e| remote_lookup_failed(&e.to_string()))?;
        let access_token = self
            .token_manager
            .access_token()
            .await
            .map_err(|e| remote_lookup_failed(&e.to_string()))?;

        debug!(calendar_id, event_id, "Deleting calendar event");

        let response = self
            .client
            .delete(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| remote_lookup_failed(&format!("Failed to delete event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(remote_lookup_failed(&format!("HTTP {} - {}", status, error_body)));
        }

        Ok(())
    }
}
