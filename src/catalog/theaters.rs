use std::sync::Arc;

use tracing::debug;

use crate::db::{TheaterRepo, TheaterShowing};
use crate::error::CoreResult;

/// Finds the theaters currently showing a movie.
///
/// Showtimes live inside each theater record, so the lookup flattens every
/// schedule and keeps the entries that reference the movie. A theater with
/// two matching showtimes yields two entries.
pub struct TheaterJoin {
    theaters: Arc<dyn TheaterRepo>,
}

impl TheaterJoin {
    pub fn new(theaters: Arc<dyn TheaterRepo>) -> Self {
        Self { theaters }
    }

    pub async fn showing(&self, movie_id: &str) -> CoreResult<Vec<TheaterShowing>> {
        let showings = self.theaters.theaters_showing(movie_id).await?;
        debug!(movie_id, count = showings.len(), "theaters showing movie");
        Ok(showings)
    }
}
