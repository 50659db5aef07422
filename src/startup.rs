use crate::commands::{create_error_embed, get_all_application_commands, CommandContext};
use crate::components::{event_session::EventSession, ComponentManager};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use poise::serenity_prelude as serenity;
use serenity::model::user::OnlineStatus;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn,poise=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and start the Discord bot
pub async fn start_bot(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    // Get Discord token and activity
    let token = {
        let config_read = config.read().await;
        config_read.discord_token.clone()
    };

    let activity = {
        let config_read = config.read().await;
        config_read.activity.clone()
    };

    // Set up framework options
    let options = poise::FrameworkOptions {
        commands: get_all_application_commands(),
        on_error: |error| Box::pin(on_error(error)),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some("!".to_string()),
            case_insensitive_commands: true,
            ..Default::default()
        },
        ..Default::default()
    };

    // Set intents
    let intents = serenity::GatewayIntents::non_privileged();

    // Initialize component manager and register components
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(EventSession::new());
    let component_manager = Arc::new(component_manager);

    // Create a shared data context for commands
    let command_data = CommandContext::new(Arc::clone(&config))
        .with_component_manager(Arc::clone(&component_manager));

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Clone component manager for shutdown handler
    let shutdown_components = Arc::clone(&component_manager);

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    // Create framework with new poise API
    let client_result = poise::serenity_prelude::ClientBuilder::new(token, intents)
        .framework(poise::Framework::new(
            options,
            move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("{} is connected!", ready.user.name);

                    // Set the bot's status
                    ctx.set_presence(
                        Some(serenity::ActivityData::playing(&activity)),
                        OnlineStatus::Online,
                    );
                    info!("Setting activity to {}", activity);

                    // Initialize components
                    let components = Arc::clone(&component_manager);
                    if let Err(e) = components.init_all(ctx, Arc::clone(&config)).await {
                        error!("Failed to initialize components: {:?}", e);
                    }

                    // Register slash commands
                    if let Err(e) =
                        poise::builtins::register_globally(ctx, &framework.options().commands).await
                    {
                        error!("Failed to register slash commands: {:?}", e);
                    } else {
                        info!("Slash commands registered successfully");
                    }

                    Ok(command_data)
                })
            },
        ))
        .await;

    // Start the bot
    info!("Starting bot...");
    let mut client = client_result.map_err(Error::from)?;

    // Create a separate task to handle the client
    let client_handle = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            Err(Error::from(e))
        } else {
            Ok(())
        }
    });

    // Wait for either the client to end or a shutdown signal
    tokio::select! {
        result = client_handle => {
            info!("Bot process ended");
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    error!("Client task error: {:?}", e);
                    Err(Error::Other(format!("Client task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, shutting down bot...");
            Ok(())
        }
    }
}

/// Handle errors from commands
async fn on_error(error: poise::FrameworkError<'_, CommandContext, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Error during setup: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            // Session errors are the member's to correct; anything else is
            // an infrastructure fault worth a loud log line.
            if error.is_user_reportable() {
                warn!("Command '{}' rejected: {}", ctx.command().name, error);
            } else {
                error!("Error in command '{}': {:?}", ctx.command().name, error);
            }
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed("Command failed", &format!("{}", error)))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                error!("Command check failed: {:?}", error);
                if let Err(e) = ctx
                    .send(
                        poise::CreateReply::default()
                            .embed(create_error_embed("Check failed", &format!("{}", error)))
                            .ephemeral(true),
                    )
                    .await
                {
                    error!("Error while sending error message: {:?}", e);
                }
            } else if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed(
                            "Insufficient permissions",
                            "You do not have sufficient permissions to use this command!",
                        ))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        error => {
            error!("Other error: {:?}", error);
        }
    }
}
