use super::colors::EventColor;
use chrono::DateTime;
use chrono_tz::Tz;

/// Simplified representation of an event fetched from the calendar API
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub color_id: Option<String>,
    pub time_zone: Option<String>,
    pub created: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
}

/// Identity and final field snapshot of an event the calendar store has
/// accepted, returned from a successful confirm
#[derive(Debug, Clone)]
pub struct PersistedEvent {
    pub event_id: String,
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: DateTime<Tz>,
    pub end_time: DateTime<Tz>,
    pub color: EventColor,
}
