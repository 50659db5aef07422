use super::colors::EventColor;
use super::models::CalendarEvent;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A staged, not-yet-persisted event under construction for one guild.
///
/// The viewable date fields mirror `start_time`/`end_time` for display
/// formatting and only ever move together with them, so they are kept
/// private behind the setters.
#[derive(Debug, Clone)]
pub struct DraftEvent {
    /// Guild this draft belongs to; key of the session
    pub guild_id: u64,
    /// Calendar the event will be written to, fixed at session start
    pub calendar_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Tz>>,
    pub end_time: Option<DateTime<Tz>>,
    pub color: EventColor,
    /// Zone used to interpret all raw date/time text for this draft
    pub timezone: Tz,
    /// Set when this draft was seeded by copying an existing event
    pub source_event_id: Option<String>,
    /// When the session began; diagnostics only
    pub created: DateTime<Utc>,

    viewable_start_date: Option<DateTime<Tz>>,
    viewable_end_date: Option<DateTime<Tz>>,
}

impl DraftEvent {
    /// Create a fresh draft with every field empty
    pub fn new(guild_id: u64, calendar_id: String, timezone: Tz) -> Self {
        Self {
            guild_id,
            calendar_id,
            summary: None,
            description: None,
            start_time: None,
            end_time: None,
            color: EventColor::None,
            timezone,
            source_event_id: None,
            created: Utc::now(),
            viewable_start_date: None,
            viewable_end_date: None,
        }
    }

    /// Create a draft seeded from an existing calendar event. Summary,
    /// description, color and zone are copied; start/end stay empty so the
    /// member specifies new times.
    pub fn from_existing(
        guild_id: u64,
        calendar_id: String,
        fallback_timezone: Tz,
        source: &CalendarEvent,
    ) -> Self {
        let timezone = source
            .time_zone
            .as_deref()
            .and_then(|tz| tz.parse::<Tz>().ok())
            .unwrap_or(fallback_timezone);

        Self {
            guild_id,
            calendar_id,
            summary: source.summary.clone(),
            description: source.description.clone(),
            start_time: None,
            end_time: None,
            color: EventColor::from_color_id(source.color_id.as_deref()),
            timezone,
            source_event_id: Some(source.id.clone()),
            created: Utc::now(),
            viewable_start_date: None,
            viewable_end_date: None,
        }
    }

    /// Set the start instant and its viewable mirror together
    pub fn set_start_time(&mut self, start: DateTime<Tz>) {
        self.start_time = Some(start);
        self.viewable_start_date = Some(start);
    }

    /// Set the end instant and its viewable mirror together
    pub fn set_end_time(&mut self, end: DateTime<Tz>) {
        self.end_time = Some(end);
        self.viewable_end_date = Some(end);
    }

    /// Display-oriented copy of the start instant
    pub fn viewable_start_date(&self) -> Option<DateTime<Tz>> {
        self.viewable_start_date
    }

    /// Display-oriented copy of the end instant
    pub fn viewable_end_date(&self) -> Option<DateTime<Tz>> {
        self.viewable_end_date
    }

    /// Whether everything commit requires is present: summary, start and
    /// end. Description and color are optional.
    pub fn has_required_values(&self) -> bool {
        self.summary.is_some() && self.start_time.is_some() && self.end_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::event_session::validators::parse_datetime;

    fn tz() -> Tz {
        "UTC".parse().unwrap()
    }

    #[test]
    fn test_new_draft_is_empty() {
        let draft = DraftEvent::new(42, "cal".to_string(), tz());
        assert!(draft.summary.is_none());
        assert!(draft.description.is_none());
        assert!(draft.start_time.is_none());
        assert!(draft.end_time.is_none());
        assert_eq!(draft.color, EventColor::None);
        assert!(draft.source_event_id.is_none());
        assert!(!draft.has_required_values());
    }

    #[test]
    fn test_viewable_dates_mirror_setters() {
        let mut draft = DraftEvent::new(42, "cal".to_string(), tz());
        let start = parse_datetime("2099/01/10-09:00:00", tz()).unwrap();
        let end = parse_datetime("2099/01/10-10:00:00", tz()).unwrap();

        draft.set_start_time(start);
        assert_eq!(draft.viewable_start_date(), Some(start));
        assert!(draft.viewable_end_date().is_none());

        draft.set_end_time(end);
        assert_eq!(draft.viewable_end_date(), Some(end));
    }

    #[test]
    fn test_required_values_gate() {
        let mut draft = DraftEvent::new(42, "cal".to_string(), tz());
        draft.summary = Some("Team Sync".to_string());
        assert!(!draft.has_required_values());

        draft.set_start_time(parse_datetime("2099/01/10-09:00:00", tz()).unwrap());
        assert!(!draft.has_required_values());

        draft.set_end_time(parse_datetime("2099/01/10-10:00:00", tz()).unwrap());
        assert!(draft.has_required_values());
    }

    #[test]
    fn test_from_existing_copies_details_but_not_times() {
        let source = CalendarEvent {
            id: "source123".to_string(),
            summary: Some("Movie night".to_string()),
            description: Some("Bring snacks".to_string()),
            color_id: Some("9".to_string()),
            time_zone: Some("Europe/Helsinki".to_string()),
            start_date_time: Some("2023-01-01T10:00:00Z".to_string()),
            end_date_time: Some("2023-01-01T12:00:00Z".to_string()),
            created: None,
        };

        let draft = DraftEvent::from_existing(42, "cal".to_string(), tz(), &source);
        assert_eq!(draft.summary.as_deref(), Some("Movie night"));
        assert_eq!(draft.description.as_deref(), Some("Bring snacks"));
        assert_eq!(draft.color, EventColor::Blue);
        assert_eq!(draft.timezone.name(), "Europe/Helsinki");
        assert_eq!(draft.source_event_id.as_deref(), Some("source123"));
        assert!(draft.start_time.is_none());
        assert!(draft.end_time.is_none());
        assert!(draft.viewable_start_date().is_none());
        assert!(draft.viewable_end_date().is_none());
    }
}
