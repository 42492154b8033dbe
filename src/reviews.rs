use std::sync::Arc;

use tracing::info;

use crate::catalog::CatalogStore;
use crate::db::{Review, ReviewRepo};
use crate::error::{CoreError, CoreResult};
use crate::util::new_id;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Stores and lists movie reviews.
///
/// Submitting does not check that the movie exists, while listing does.
/// Reviews for unknown movies can therefore be written but never read back.
pub struct ReviewStore {
    catalog: Arc<CatalogStore>,
    reviews: Arc<dyn ReviewRepo>,
}

impl ReviewStore {
    pub fn new(catalog: Arc<CatalogStore>, reviews: Arc<dyn ReviewRepo>) -> Self {
        Self { catalog, reviews }
    }

    pub async fn submit_review(
        &self,
        user_id: &str,
        movie_id: &str,
        rating: i32,
        feedback: Option<String>,
    ) -> CoreResult<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(CoreError::invalid(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        let review = Review {
            id: new_id(),
            movie_id: movie_id.to_string(),
            user_id: user_id.to_string(),
            rating,
            feedback,
        };

        self.reviews.insert_review(&review).await?;
        info!(review_id = %review.id, movie_id, user_id, rating, "review submitted");

        Ok(review)
    }

    pub async fn get_reviews(&self, movie_id: &str) -> CoreResult<Vec<Review>> {
        self.catalog.get_movie(movie_id).await.map_err(|e| match e {
            CoreError::InvalidId(id) => CoreError::MovieNotFound(id),
            other => other,
        })?;

        Ok(self.reviews.list_reviews_by_movie(movie_id).await?)
    }
}
