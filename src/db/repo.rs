use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::*;

#[async_trait]
pub trait MovieRepo: Send + Sync {
    async fn get_movie(&self, id: &str) -> DbResult<Movie>;
    async fn count_movies(&self) -> DbResult<i64>;
    async fn list_movies(&self, skip: i64, limit: i64) -> DbResult<Vec<Movie>>;
    async fn find_movies(&self, filter: &MovieFilter) -> DbResult<Vec<Movie>>;
    async fn find_movies_by_genres(&self, genres: &[String], limit: i64) -> DbResult<Vec<Movie>>;
    async fn upsert_movie(&self, movie: &Movie) -> DbResult<()>;
}

#[async_trait]
pub trait TheaterRepo: Send + Sync {
    async fn get_theater(&self, id: &str) -> DbResult<Theater>;
    /// Every (theater, showtime) pair whose showtime references `movie_id`.
    async fn theaters_showing(&self, movie_id: &str) -> DbResult<Vec<TheaterShowing>>;
    async fn upsert_theater(&self, theater: &Theater) -> DbResult<()>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn find_active_subscription(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Subscription>>;
    async fn upsert_subscription(&self, subscription: &Subscription) -> DbResult<()>;
}

#[async_trait]
pub trait BookingRepo: Send + Sync {
    async fn get_booking(&self, id: &str) -> DbResult<Booking>;
    async fn count_bookings(&self) -> DbResult<i64>;
    async fn insert_booking(&self, booking: &Booking) -> DbResult<()>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn list_reviews_by_movie(&self, movie_id: &str) -> DbResult<Vec<Review>>;
    async fn insert_review(&self, review: &Review) -> DbResult<()>;
}

#[async_trait]
pub trait AccessTokenRepo: Send + Sync {
    async fn get_token(&self, token: &str) -> DbResult<AccessToken>;
    async fn upsert_token(&self, token: &AccessToken) -> DbResult<()>;
}

#[async_trait]
pub trait Repository:
    MovieRepo + TheaterRepo + SubscriptionRepo + BookingRepo + ReviewRepo + AccessTokenRepo + Send + Sync
{
    /// Wait for checked-out connections to be returned, then close the pool.
    async fn close(&self);
}
