//! Bulk import of catalog data.
//!
//! Movies, theaters, subscriptions and access tokens are owned by other
//! systems; this loads a YAML export of them into the local store. Records
//! are upserted by id, so importing the same file twice is harmless.

use serde::Deserialize;
use tracing::info;

use crate::db::{AccessToken, DbError, Movie, Repository, Subscription, Theater};
use crate::util::is_valid_id;

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub theaters: Vec<Theater>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub accesstokens: Vec<AccessToken>,
}

#[derive(Debug, Default, PartialEq)]
pub struct SeedSummary {
    pub movies: usize,
    pub theaters: usize,
    pub subscriptions: usize,
    pub accesstokens: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse seed file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid seed record: {0}")]
    Invalid(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl SeedData {
    pub fn from_file(path: &str) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SeedError::ReadError(path.to_string(), e))?;

        serde_yaml::from_str(&content).map_err(|e| SeedError::ParseError(path.to_string(), e))
    }

    /// Check every record before anything is written.
    pub fn validate(&self) -> Result<(), SeedError> {
        for movie in &self.movies {
            check_id("movie", &movie.id)?;
            if !movie.ticket_price.is_finite() || movie.ticket_price <= 0.0 {
                return Err(SeedError::Invalid(format!(
                    "movie {} has ticket price {}",
                    movie.id, movie.ticket_price
                )));
            }
        }

        for theater in &self.theaters {
            check_id("theater", &theater.id)?;
            for showtime in &theater.movie_showtimes {
                check_id("showtime movie", &showtime.movie_id)?;
            }
        }

        for sub in &self.subscriptions {
            check_id("subscription", &sub.id)?;
            if !(0.0..=100.0).contains(&sub.discount_percentage) {
                return Err(SeedError::Invalid(format!(
                    "subscription {} has discount {}",
                    sub.id, sub.discount_percentage
                )));
            }
            if sub.end_date < sub.start_date {
                return Err(SeedError::Invalid(format!(
                    "subscription {} ends before it starts",
                    sub.id
                )));
            }
        }

        Ok(())
    }
}

fn check_id(kind: &str, id: &str) -> Result<(), SeedError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(SeedError::Invalid(format!("{} id {:?} is not a UUID", kind, id)))
    }
}

pub async fn import<R: Repository + ?Sized>(repo: &R, data: &SeedData) -> Result<SeedSummary, SeedError> {
    data.validate()?;

    for movie in &data.movies {
        repo.upsert_movie(movie).await?;
    }
    for theater in &data.theaters {
        repo.upsert_theater(theater).await?;
    }
    for sub in &data.subscriptions {
        repo.upsert_subscription(sub).await?;
    }
    for token in &data.accesstokens {
        repo.upsert_token(token).await?;
    }

    let summary = SeedSummary {
        movies: data.movies.len(),
        theaters: data.theaters.len(),
        subscriptions: data.subscriptions.len(),
        accesstokens: data.accesstokens.len(),
    };
    info!(
        movies = summary.movies,
        theaters = summary.theaters,
        subscriptions = summary.subscriptions,
        accesstokens = summary.accesstokens,
        "Seed data imported"
    );

    Ok(summary)
}
