use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::pagination::{check_window, current_page, page_total, Page};
use super::theaters::TheaterJoin;
use crate::db::{DbError, Movie, MovieFilter, MovieRepo, TheaterShowing};
use crate::error::{CoreError, CoreResult};
use crate::util::is_valid_id;

/// Movie detail joined with the theaters showing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieWithTheaters {
    #[serde(flatten)]
    pub movie: Movie,
    pub theaters: Vec<TheaterShowing>,
}

/// Read access to the movie catalog.
pub struct CatalogStore {
    movies: Arc<dyn MovieRepo>,
    theaters: TheaterJoin,
}

impl CatalogStore {
    pub fn new(movies: Arc<dyn MovieRepo>, theaters: TheaterJoin) -> Self {
        Self { movies, theaters }
    }

    pub async fn list_movies(&self, skip: i64, limit: i64) -> CoreResult<Page<Movie>> {
        check_window(skip, limit)?;

        let count = self.movies.count_movies().await?;
        let items = self.movies.list_movies(skip, limit).await?;

        Ok(Page {
            items,
            current_page: current_page(skip, limit),
            page_total: page_total(count, limit),
        })
    }

    pub async fn get_movie(&self, id: &str) -> CoreResult<Movie> {
        if !is_valid_id(id) {
            return Err(CoreError::InvalidId(id.to_string()));
        }

        match self.movies.get_movie(id).await {
            Ok(movie) => Ok(movie),
            Err(DbError::NotFound(_)) => Err(CoreError::MovieNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Exact-match search. Empty strings count as absent, and at least one
    /// field must remain.
    pub async fn search_movies(&self, filter: MovieFilter) -> CoreResult<Vec<Movie>> {
        let filter = MovieFilter {
            title: filter.title.filter(|s| !s.is_empty()),
            genre: filter.genre.filter(|s| !s.is_empty()),
            release_date: filter.release_date,
        };

        if filter.title.is_none() && filter.genre.is_none() && filter.release_date.is_none() {
            return Err(CoreError::invalid(
                "At least one of title, genre, or release_date is required",
            ));
        }

        Ok(self.movies.find_movies(&filter).await?)
    }

    pub async fn get_movie_with_theaters(&self, id: &str) -> CoreResult<MovieWithTheaters> {
        let movie = self.get_movie(id).await.map_err(|e| match e {
            CoreError::InvalidId(id) => CoreError::MovieNotFound(id),
            other => other,
        })?;

        let theaters = self.theaters.showing(&movie.id).await?;
        debug!(movie_id = %movie.id, theaters = theaters.len(), "movie details");

        Ok(MovieWithTheaters { movie, theaters })
    }

    pub async fn movies_in_genres(&self, genres: &[String], limit: i64) -> CoreResult<Vec<Movie>> {
        Ok(self.movies.find_movies_by_genres(genres, limit).await?)
    }
}
