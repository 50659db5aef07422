use crate::error::{env_error, BotResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Default activity text for the bot
pub const DEFAULT_ACTIVITY: &str = "Raapustaa kalenteriin";

/// Calendar binding for a single guild: which calendar its events are
/// written to, and optionally a zone overriding the global default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarBinding {
    /// Google Calendar ID events are created in
    pub calendar_id: String,
    /// IANA timezone used to interpret raw date/time input for this guild
    pub timezone: Option<String>,
}

/// Main configuration structure for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// OAuth refresh token used to mint access tokens
    pub google_refresh_token: String,
    /// Role name a member must hold to use event commands (everyone if unset)
    pub control_role: Option<String>,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
    /// Map of guild ID to its calendar binding
    pub calendars: HashMap<String, CalendarBinding>,
    /// Default timezone for guilds whose binding does not set one
    pub timezone: String,
    /// Bot activity status text
    pub activity: String,
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let discord_token = env::var("DISCORD_TOKEN").map_err(|_| env_error("DISCORD_TOKEN"))?;
        let google_client_id = env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let google_refresh_token = env::var("GOOGLE_REFRESH_TOKEN").map_err(|_| env_error("GOOGLE_REFRESH_TOKEN"))?;

        // Optional role gate for event commands
        let control_role = env::var("CONTROL_ROLE").ok().filter(|r| !r.is_empty());

        // Default timezone
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        // Bot activity status
        let activity = env::var("BOT_ACTIVITY").unwrap_or_else(|_| String::from(DEFAULT_ACTIVITY));

        // Initialize default components
        let mut components = HashMap::new();
        components.insert("event_session".to_string(), true);

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            if let Ok(file_components) = toml::from_str::<HashMap<String, bool>>(&content) {
                // Merge with defaults
                for (key, value) in file_components {
                    components.insert(key, value);
                }
            }
        }

        // Load per-guild calendar bindings from file if it exists
        let mut calendars = HashMap::new();
        if let Ok(content) = fs::read_to_string("config/calendars.toml") {
            if let Ok(file_calendars) = toml::from_str::<HashMap<String, CalendarBinding>>(&content) {
                calendars = file_calendars;
            }
        }

        Ok(Config {
            discord_token,
            google_client_id,
            google_client_secret,
            google_refresh_token,
            control_role,
            components,
            calendars,
            timezone,
            activity,
        })
    }

    /// Look up the calendar binding for a guild, if one is configured
    pub fn calendar_for(&self, guild_id: u64) -> Option<CalendarBinding> {
        self.calendars.get(&guild_id.to_string()).cloned()
    }

    /// Check if a component is enabled
    #[allow(dead_code)]
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}
