use std::sync::Arc;

use tracing::{debug, warn};

use super::preferences::PreferenceSource;
use crate::catalog::CatalogStore;
use crate::db::Movie;
use crate::error::{CoreError, CoreResult};

pub const MAX_RECOMMENDATIONS: i64 = 5;

/// Recommends catalog movies in the genres a user tends to watch.
pub struct RecommendationGateway {
    preferences: Arc<dyn PreferenceSource>,
    catalog: Arc<CatalogStore>,
}

impl RecommendationGateway {
    pub fn new(preferences: Arc<dyn PreferenceSource>, catalog: Arc<CatalogStore>) -> Self {
        Self {
            preferences,
            catalog,
        }
    }

    pub async fn recommend(&self, user_id: &str) -> CoreResult<Vec<Movie>> {
        let prefs = self
            .preferences
            .get_user_preferences(user_id)
            .await
            .map_err(|e| {
                warn!(user_id, "preference lookup failed: {}", e);
                CoreError::UpstreamUnavailable(e.to_string())
            })?;

        let genres: Vec<String> = prefs.viewing_habits.into_iter().collect();
        debug!(user_id, genres = ?genres, "recommending by genre");

        self.catalog
            .movies_in_genres(&genres, MAX_RECOMMENDATIONS)
            .await
    }
}
