use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(eventbotti::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Poise framework error: {0}")]
    #[diagnostic(code(eventbotti::poise))]
    Poise(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Environment error: {0}")]
    #[diagnostic(code(eventbotti::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(eventbotti::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(eventbotti::google_calendar))]
    GoogleCalendar(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(eventbotti::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(eventbotti::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(eventbotti::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(eventbotti::other))]
    Other(String),

    // Session error kinds reported back to the member who issued the
    // command. None of these are fatal to the process.
    #[error("The event creator has already been started for this server!")]
    #[diagnostic(code(eventbotti::session::already_active))]
    AlreadyActive,

    #[error("The event creator has not been started! Use `/event create` first!")]
    #[diagnostic(code(eventbotti::session::no_active_session))]
    NoActiveSession,

    #[error("This server does not have a calendar configured, so events cannot be managed!")]
    #[diagnostic(code(eventbotti::session::no_calendar))]
    NoCalendarConfigured,

    #[error("I can't find an event with ID `{0}`. Are you sure it is correct?")]
    #[diagnostic(code(eventbotti::session::event_not_found))]
    EventNotFound(String),

    #[error("Invalid date/time `{0}`! Use the `yyyy/MM/dd-HH:mm:ss` format.")]
    #[diagnostic(code(eventbotti::session::malformed_date_time))]
    MalformedDateTime(String),

    #[error("I can't schedule an event in the past! Please double check the date and time.")]
    #[diagnostic(code(eventbotti::session::time_in_past))]
    TimeInPast,

    #[error("The event's start must come before its end! Please double check the date and time.")]
    #[diagnostic(code(eventbotti::session::ordering_violation))]
    OrderingViolation,

    #[error("Invalid or unsupported color `{0}`! Use `/event color list` to see all colors.")]
    #[diagnostic(code(eventbotti::session::unknown_color))]
    UnknownColor(String),

    #[error("Required values are missing! A summary, start and end must all be set before confirming.")]
    #[diagnostic(code(eventbotti::session::missing_required_fields))]
    MissingRequiredFields,

    #[error("You cannot do that while the event creator is active! Cancel or confirm the draft first.")]
    #[diagnostic(code(eventbotti::session::session_active))]
    SessionActive,

    #[error("Creating the event failed: {0}")]
    #[diagnostic(code(eventbotti::session::commit_failed))]
    CommitFailed(String),

    #[error("Looking up the event failed: {0}")]
    #[diagnostic(code(eventbotti::session::remote_lookup_failed))]
    RemoteLookupFailed(String),
}

impl Error {
    /// Whether this error is a session-level kind the issuing member is
    /// expected to correct and resend, rather than an infrastructure fault.
    pub fn is_user_reportable(&self) -> bool {
        matches!(
            self,
            Error::AlreadyActive
                | Error::NoActiveSession
                | Error::NoCalendarConfigured
                | Error::EventNotFound(_)
                | Error::MalformedDateTime(_)
                | Error::TimeInPast
                | Error::OrderingViolation
                | Error::UnknownColor(_)
                | Error::MissingRequiredFields
                | Error::SessionActive
                | Error::CommitFailed(_)
                | Error::RemoteLookupFailed(_)
        )
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create commit failures carrying the remote cause
pub fn commit_failed(message: &str) -> Error {
    Error::CommitFailed(message.to_string())
}

/// Helper to create remote lookup failures carrying the remote cause
pub fn remote_lookup_failed(message: &str) -> Error {
    Error::RemoteLookupFailed(message.to_string())
}
