use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub viewing_habits: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("preference service timed out")]
    Timeout,
    #[error("preference service returned {0}")]
    Status(u16),
    #[error("preference service request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PreferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PreferenceError::Timeout
        } else if let Some(status) = e.status() {
            PreferenceError::Status(status.as_u16())
        } else {
            PreferenceError::Transport(e.to_string())
        }
    }
}

/// Source of a user's genre preferences.
#[async_trait]
pub trait PreferenceSource: Send + Sync {
    async fn get_user_preferences(&self, user_id: &str) -> Result<UserPreferences, PreferenceError>;
}

/// Talks JSON to the user service: `GET {base}/users/{id}/preferences`.
pub struct HttpPreferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPreferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PreferenceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn preferences_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/preferences",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }
}

#[async_trait]
impl PreferenceSource for HttpPreferenceClient {
    async fn get_user_preferences(&self, user_id: &str) -> Result<UserPreferences, PreferenceError> {
        let url = self.preferences_url(user_id);
        debug!("Fetching preferences from {}", url);

        let prefs = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<UserPreferences>()
            .await?;

        Ok(prefs)
    }
}
