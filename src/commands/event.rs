use crate::commands::{CommandResult, Context};
use crate::components::event_session::colors::{self, ALL_COLORS};
use crate::components::event_session::{CalendarEvent, DraftEvent, EventColor, PersistedEvent};
use chrono::DateTime;
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;

/// Author and manage calendar events
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::has_control_role",
    subcommands(
        "create",
        "copy",
        "cancel",
        "view",
        "confirm",
        "delete",
        "summary",
        "description",
        "start",
        "end",
        "color"
    )
)]
pub async fn event(ctx: Context<'_>) -> CommandResult {
    ctx.say(
        "Please specify an event function: `create`, `copy`, `cancel`, `view`, `confirm`, \
         `delete`, `summary`, `description`, `start`, `end` or `color`.",
    )
    .await?;
    Ok(())
}

/// Start authoring a new event
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn create(ctx: Context<'_>) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, binding, timezone) = super::guild_binding(&ctx).await?;

    handle.start(guild_id, binding.calendar_id, timezone).await?;
    ctx.say(
        "Event creator started! Please specify the event summary with `/event summary <summary>`.",
    )
    .await?;
    Ok(())
}

/// Start authoring a new event by copying an existing one
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn copy(
    ctx: Context<'_>,
    #[description = "ID of the event to copy"] event_id: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, binding, timezone) = super::guild_binding(&ctx).await?;

    let draft = handle
        .start_from_existing(guild_id, binding.calendar_id, timezone, &event_id)
        .await?;

    ctx.send(
        poise::CreateReply::default()
            .content("Event creator started! Event details copied, please specify the date/times.")
            .embed(draft_embed(&draft)),
    )
    .await?;
    Ok(())
}

/// Cancel the event being authored
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn cancel(ctx: Context<'_>) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    handle.cancel(guild_id).await?;
    ctx.say("Event creation cancelled! The draft has been discarded.").await?;
    Ok(())
}

/// Review the event being authored, or view an existing calendar event
#[poise::command(slash_command, prefix_command, guild_only, aliases("review"))]
pub async fn view(
    ctx: Context<'_>,
    #[description = "ID of an existing event to view"] event_id: Option<String>,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, binding, _) = super::guild_binding(&ctx).await?;

    if handle.has_active(guild_id).await {
        if event_id.is_some() {
            ctx.say(
                "The event creator is active! You cannot view another event until the draft \
                 is confirmed or cancelled.",
            )
            .await?;
            return Ok(());
        }

        let draft = handle.snapshot(guild_id).await?;
        ctx.send(
            poise::CreateReply::default()
                .content("Confirm the event with `/event confirm` to add it to the calendar, or keep editing the values!")
                .embed(draft_embed(&draft)),
        )
        .await?;
        return Ok(());
    }

    match event_id {
        Some(event_id) => {
            let existing = handle.lookup_existing(&binding.calendar_id, &event_id).await?;
            ctx.send(poise::CreateReply::default().embed(existing_event_embed(&existing)))
                .await?;
        }
        None => {
            ctx.say(
                "No event is being authored! Start one with `/event create`, or use \
                 `/event view <event ID>` to view an event already in the calendar.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Confirm the event being authored and add it to the calendar
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn confirm(ctx: Context<'_>) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let persisted = handle.confirm(guild_id).await?;
    ctx.send(
        poise::CreateReply::default()
            .content("Event confirmed!")
            .embed(persisted_embed(&persisted)),
    )
    .await?;
    Ok(())
}

/// Delete an event from the calendar
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "ID of the event to delete"] event_id: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, binding, _) = super::guild_binding(&ctx).await?;

    handle.delete_existing(guild_id, &binding.calendar_id, &event_id).await?;
    ctx.say("Event successfully deleted!").await?;
    Ok(())
}

/// Set the summary of the event being authored
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn summary(
    ctx: Context<'_>,
    #[description = "Event summary"]
    #[rest]
    text: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let draft = handle.set_summary(guild_id, &text).await?;
    ctx.say(format!(
        "Event summary set to: ```{}```\nPlease specify the event description with \
         `/event description <description>`.",
        draft.summary.unwrap_or_default()
    ))
    .await?;
    Ok(())
}

/// Set the description of the event being authored
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn description(
    ctx: Context<'_>,
    #[description = "Event description"]
    #[rest]
    text: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let draft = handle.set_description(guild_id, &text).await?;
    ctx.say(format!(
        "Event description set to: ```{}```\nPlease specify the start date and time (24h) in \
         `yyyy/MM/dd-HH:mm:ss` format with `/event start <date-and-time>`.",
        draft.description.unwrap_or_default()
    ))
    .await?;
    Ok(())
}

/// Set the start date and time of the event being authored
#[poise::command(slash_command, prefix_command, guild_only, aliases("startDate", "startdate"))]
pub async fn start(
    ctx: Context<'_>,
    #[description = "Start in yyyy/MM/dd-HH:mm:ss format"] date_time: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let draft = handle.set_start(guild_id, &date_time).await?;
    ctx.say(format!(
        "Event start date set to `{}`, start time set to `{}`.\nPlease specify the end date \
         and time (24h) in `yyyy/MM/dd-HH:mm:ss` format with `/event end <date-and-time>`.",
        format_date(draft.viewable_start_date()),
        format_time(draft.viewable_start_date()),
    ))
    .await?;
    Ok(())
}

/// Set the end date and time of the event being authored
#[poise::command(slash_command, prefix_command, guild_only, aliases("endDate", "enddate"))]
pub async fn end(
    ctx: Context<'_>,
    #[description = "End in yyyy/MM/dd-HH:mm:ss format"] date_time: String,
) -> CommandResult {
    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let draft = handle.set_end(guild_id, &date_time).await?;
    ctx.say(format!(
        "Event end date set to `{}`, end time set to `{}`.\nIf you would like a specific color \
         for the event use `/event color <name or ID>`; `/event color list` shows all colors. \
         Otherwise review the event with `/event view`!",
        format_date(draft.viewable_end_date()),
        format_time(draft.viewable_end_date()),
    ))
    .await?;
    Ok(())
}

/// Set the color of the event being authored, or list all colors
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn color(
    ctx: Context<'_>,
    #[description = "Color name, hex value or ID; or `list`"] value: String,
) -> CommandResult {
    // The listing keyword is a display request, never a field assignment
    if colors::is_list_request(&value) {
        let mut list = String::from("All colors:");
        for color in ALL_COLORS {
            list.push_str(&format!("\nName: {}, ID: {}", color.display_name(), color.id()));
        }
        list.push_str("\n\nUse `/event color <name or ID>` to set the event's color!");
        ctx.say(list).await?;
        return Ok(());
    }

    let handle = super::session_handle(&ctx).await?;
    let (guild_id, _, _) = super::guild_binding(&ctx).await?;

    let draft = handle.set_color(guild_id, &value).await?;
    ctx.say(format!(
        "Event color set to `{}`.\nReview the event with `/event view` to verify everything is \
         correct, then confirm it with `/event confirm`!",
        draft.color.display_name()
    ))
    .await?;
    Ok(())
}

fn format_date(dt: Option<DateTime<Tz>>) -> String {
    dt.map(|dt| dt.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| "Not set".to_string())
}

fn format_time(dt: Option<DateTime<Tz>>) -> String {
    dt.map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "Not set".to_string())
}

fn format_date_time(dt: Option<DateTime<Tz>>) -> String {
    dt.map(|dt| dt.format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_else(|| "Not set".to_string())
}

fn embed_colour(color: EventColor) -> serenity::Colour {
    color
        .hex()
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .map(serenity::Colour::new)
        .unwrap_or(serenity::Colour::BLURPLE)
}

/// Render the draft's human-viewable snapshot fields
fn draft_embed(draft: &DraftEvent) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("Event draft")
        .colour(embed_colour(draft.color))
        .field(
            "Summary",
            draft.summary.clone().unwrap_or_else(|| "Not set".to_string()),
            false,
        )
        .field(
            "Description",
            draft.description.clone().unwrap_or_else(|| "Not set".to_string()),
            false,
        )
        .field("Start", format_date_time(draft.viewable_start_date()), true)
        .field("End", format_date_time(draft.viewable_end_date()), true)
        .field("Color", draft.color.display_name(), true)
        .field("TimeZone", draft.timezone.name(), true);

    if let Some(source_event_id) = &draft.source_event_id {
        embed = embed.field("Copied from", format!("`{}`", source_event_id), true);
    }

    embed
}

fn persisted_embed(persisted: &PersistedEvent) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Event confirmed")
        .colour(embed_colour(persisted.color))
        .field("Event ID", format!("`{}`", persisted.event_id), false)
        .field("Summary", persisted.summary.clone(), false)
        .field(
            "Description",
            persisted.description.clone().unwrap_or_else(|| "Not set".to_string()),
            false,
        )
        .field("Start", format_date_time(Some(persisted.start_time)), true)
        .field("End", format_date_time(Some(persisted.end_time)), true)
        .field("Color", persisted.color.display_name(), true)
}

fn existing_event_embed(event: &CalendarEvent) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Calendar event")
        .colour(embed_colour(EventColor::from_color_id(event.color_id.as_deref())))
        .field("Event ID", format!("`{}`", event.id), false)
        .field(
            "Summary",
            event.summary.clone().unwrap_or_else(|| "Not set".to_string()),
            false,
        )
        .field(
            "Description",
            event.description.clone().unwrap_or_else(|| "Not set".to_string()),
            false,
        )
        .field(
            "Start",
            event.start_date_time.clone().unwrap_or_else(|| "Not set".to_string()),
            true,
        )
        .field(
            "End",
            event.end_date_time.clone().unwrap_or_else(|| "Not set".to_string()),
            true,
        )
}
