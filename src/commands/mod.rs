use crate::components::event_session::EventSession;
use crate::components::{ComponentManager, EventSessionHandle};
use crate::config::{CalendarBinding, Config};
use crate::error::{BotResult, Error};
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;

// Export submodules
pub mod event;
pub mod util;

/// Shared context for all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub component_manager: Option<Arc<ComponentManager>>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            component_manager: None,
        }
    }

    /// Set the component manager
    pub fn with_component_manager(mut self, component_manager: Arc<ComponentManager>) -> Self {
        self.component_manager = Some(component_manager);
        self
    }
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, crate::error::Error>;

/// All application commands and event listeners
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, crate::error::Error>> {
    vec![util::ping(), event::event()]
}

/// Create an embed for a successful operation
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title.to_string())
        .description(description.to_string())
        .colour(serenity::Colour::DARK_GREEN)
}

/// Create an embed for a failed operation
pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title.to_string())
        .description(description.to_string())
        .colour(serenity::Colour::RED)
}

/// Fetch the event session protocol handle from the component manager
pub async fn session_handle(ctx: &Context<'_>) -> BotResult<EventSessionHandle> {
    let component_manager = ctx
        .data()
        .component_manager
        .as_ref()
        .ok_or_else(|| Error::Component("Component manager not available".to_string()))?;

    let component = component_manager
        .get_component_by_name("event_session")
        .ok_or_else(|| Error::Component("Event session component not registered".to_string()))?;

    let session = component
        .as_any()
        .downcast_ref::<EventSession>()
        .ok_or_else(|| Error::Component("Event session component has unexpected type".to_string()))?;

    session
        .get_handle()
        .await
        .ok_or_else(|| Error::Component("Event session component not initialized".to_string()))
}

/// Resolve the invoking guild's calendar binding and session zone.
/// Commands that touch the calendar fail with `NoCalendarConfigured` when
/// the guild has no binding.
pub async fn guild_binding(ctx: &Context<'_>) -> BotResult<(u64, CalendarBinding, Tz)> {
    let guild_id = ctx.guild_id().ok_or(Error::NoCalendarConfigured)?.get();

    let (binding, default_zone) = {
        let config_read = ctx.data().config.read().await;
        (config_read.calendar_for(guild_id), config_read.timezone.clone())
    };
    let binding = binding.ok_or(Error::NoCalendarConfigured)?;

    let zone_name = binding.timezone.clone().unwrap_or(default_zone);
    let timezone: Tz = zone_name
        .parse()
        .map_err(|_| Error::Config(format!("Invalid timezone: {}", zone_name)))?;

    Ok((guild_id, binding, timezone))
}

/// Command check: the member must hold the configured control role. With
/// no role configured, everyone passes.
pub async fn has_control_role(ctx: Context<'_>) -> Result<bool, Error> {
    let role_name = {
        let config_read = ctx.data().config.read().await;
        config_read.control_role.clone()
    };
    let Some(role_name) = role_name else {
        return Ok(true);
    };

    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };
    let Some(guild) = ctx.guild() else {
        return Ok(false);
    };

    let allowed = guild
        .roles
        .values()
        .any(|role| role.name.eq_ignore_ascii_case(&role_name) && member.roles.contains(&role.id));

    Ok(allowed)
}
