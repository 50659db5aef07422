use crate::config::Config;
use crate::error::{google_calendar_error, BotResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// An access token together with its expiry timestamp
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Manages the Google OAuth access token: caches it in-process and
/// refreshes it with the configured refresh token when it expires
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>, client: Client) -> Self {
        Self {
            config,
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, refreshing if the cached one has expired
    pub async fn access_token(&self) -> BotResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = &*cached {
                // Leave a small margin so a token doesn't expire mid-request
                if token.expires_at > Utc::now().timestamp() + 30 {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);
        Ok(access_token)
    }

    /// Exchange the refresh token for a new access token
    async fn refresh(&self) -> BotResult<CachedToken> {
        debug!("Refreshing Google Calendar access token");

        let (client_id, client_secret, refresh_token) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
                config_read.google_refresh_token.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?
            .to_string();

        let expires_in = token.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600);

        Ok(CachedToken {
            access_token,
            expires_at: Utc::now().timestamp() + expires_in,
        })
    }
}
