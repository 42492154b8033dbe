use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::info;

use super::pricing::compute_total;
use super::subscription::SubscriptionLookup;
use crate::catalog::CatalogStore;
use crate::db::{Booking, BookingRepo, BookingStatus, DbError, Theater, TheaterRepo};
use crate::error::{CoreError, CoreResult};
use crate::util::{is_valid_id, new_id};

/// Creates bookings.
///
/// Each call validates the movie and theater, prices the tickets and then
/// performs a single insert. Nothing limits how many bookings a showtime
/// gets, and concurrent calls for the same showtime all succeed.
pub struct BookingEngine {
    catalog: Arc<CatalogStore>,
    theaters: Arc<dyn TheaterRepo>,
    subscriptions: SubscriptionLookup,
    bookings: Arc<dyn BookingRepo>,
}

impl BookingEngine {
    pub fn new(
        catalog: Arc<CatalogStore>,
        theaters: Arc<dyn TheaterRepo>,
        subscriptions: SubscriptionLookup,
        bookings: Arc<dyn BookingRepo>,
    ) -> Self {
        Self {
            catalog,
            theaters,
            subscriptions,
            bookings,
        }
    }

    pub async fn create_booking(
        &self,
        user_id: &str,
        movie_id: &str,
        theater_id: &str,
        showtime: &str,
        ticket_count: i64,
    ) -> CoreResult<Booking> {
        let movie = self.catalog.get_movie(movie_id).await.map_err(|e| match e {
            CoreError::InvalidId(id) => CoreError::MovieNotFound(id),
            other => other,
        })?;

        let theater = self.get_theater(theater_id).await?;

        // The store keeps millisecond precision.
        let now = Utc::now().trunc_subsecs(3);
        let discount = self.subscriptions.active_discount(user_id, now).await?;
        let total_amount = compute_total(movie.ticket_price, ticket_count, discount)?;

        let booking = Booking {
            id: new_id(),
            user_id: user_id.to_string(),
            movie_id: movie.id,
            theater_id: theater.id,
            showtime: showtime.to_string(),
            booking_date: now,
            number_of_tickets: ticket_count,
            total_amount,
            status: BookingStatus::Booked,
        };

        self.bookings.insert_booking(&booking).await?;

        info!(
            booking_id = %booking.id,
            user_id,
            movie_id = %booking.movie_id,
            theater_id = %booking.theater_id,
            tickets = ticket_count,
            total = total_amount,
            discount = ?discount,
            "booking created"
        );

        Ok(booking)
    }

    async fn get_theater(&self, id: &str) -> CoreResult<Theater> {
        if !is_valid_id(id) {
            return Err(CoreError::TheaterNotFound(id.to_string()));
        }

        match self.theaters.get_theater(id).await {
            Ok(theater) => Ok(theater),
            Err(DbError::NotFound(_)) => Err(CoreError::TheaterNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BookingRepo, MovieRepo, SqliteRepository, SubscriptionRepo, TheaterRepo};
    use crate::testutil::{catalog, current_subscription, movie, repo, theater};

    fn engine(repo: &Arc<SqliteRepository>) -> BookingEngine {
        BookingEngine::new(
            Arc::new(catalog(repo)),
            repo.clone(),
            SubscriptionLookup::new(repo.clone()),
            repo.clone(),
        )
    }

    async fn seeded() -> (Arc<SqliteRepository>, String, String) {
        let repo = repo().await;
        let m = movie("Dune", "Sci-Fi", 10.0);
        let t = theater("Grand");
        repo.upsert_movie(&m).await.unwrap();
        repo.upsert_theater(&t).await.unwrap();
        (repo, m.id, t.id)
    }

    #[tokio::test]
    async fn test_booking_without_subscription() {
        let (repo, movie_id, theater_id) = seeded().await;

        let booking = engine(&repo)
            .create_booking("dave", &movie_id, &theater_id, "19:45", 3)
            .await
            .unwrap();

        assert_eq!(booking.total_amount, 30.0);
        assert_eq!(booking.status, BookingStatus::Booked);
        assert_eq!(booking.number_of_tickets, 3);
        assert_eq!(booking.showtime, "19:45");

        assert_eq!(booking.user_id, "dave");
        assert_eq!(booking.movie_id, movie_id);
        assert_eq!(booking.theater_id, theater_id);

        let stored = repo.get_booking(&booking.id).await.unwrap();
        assert_eq!(stored, booking);
    }

    #[tokio::test]
    async fn test_booking_applies_active_discount() {
        let (repo, movie_id, theater_id) = seeded().await;
        repo.upsert_subscription(&current_subscription("erin", 20.0))
            .await
            .unwrap();

        let booking = engine(&repo)
            .create_booking("erin", &movie_id, &theater_id, "21:00", 3)
            .await
            .unwrap();
        assert_eq!(booking.total_amount, 24.0);
    }

    #[tokio::test]
    async fn test_missing_movie_writes_nothing() {
        let (repo, _, theater_id) = seeded().await;

        let err = engine(&repo)
            .create_booking("dave", &new_id(), &theater_id, "19:45", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MovieNotFound(_)));

        let err = engine(&repo)
            .create_booking("dave", "bogus", &theater_id, "19:45", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MovieNotFound(_)));

        assert_eq!(repo.count_bookings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_theater() {
        let (repo, movie_id, _) = seeded().await;

        let err = engine(&repo)
            .create_booking("dave", &movie_id, &new_id(), "19:45", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TheaterNotFound(_)));
        assert_eq!(repo.count_bookings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_ticket_count() {
        let (repo, movie_id, theater_id) = seeded().await;

        let err = engine(&repo)
            .create_booking("dave", &movie_id, &theater_id, "19:45", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert_eq!(repo.count_bookings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_same_showtime_can_be_booked_concurrently() {
        let (repo, movie_id, theater_id) = seeded().await;
        let engine = engine(&repo);

        let (a, b) = tokio::join!(
            engine.create_booking("dave", &movie_id, &theater_id, "19:45", 200),
            engine.create_booking("erin", &movie_id, &theater_id, "19:45", 200),
        );

        assert_ne!(a.unwrap().id, b.unwrap().id);
        assert_eq!(repo.count_bookings().await.unwrap(), 2);
    }
}
