//! Fixtures shared by the unit tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use crate::catalog::{CatalogStore, TheaterJoin};
use crate::db::{Movie, SqliteRepository, Subscription, Theater};
use crate::util::new_id;

pub async fn repo() -> Arc<SqliteRepository> {
    Arc::new(SqliteRepository::in_memory().await.unwrap())
}

pub fn catalog(repo: &Arc<SqliteRepository>) -> CatalogStore {
    CatalogStore::new(repo.clone(), TheaterJoin::new(repo.clone()))
}

pub fn movie(title: &str, genre: &str, ticket_price: f64) -> Movie {
    Movie {
        id: new_id(),
        title: title.to_string(),
        genre: genre.to_string(),
        release_date: NaiveDate::from_ymd_opt(2016, 11, 11),
        ticket_price,
    }
}

pub fn theater(name: &str) -> Theater {
    Theater {
        id: new_id(),
        name: name.to_string(),
        address: format!("{} Street 1", name),
        average_rating: Some(4.0),
        movie_showtimes: Vec::new(),
    }
}

/// A subscription for `user_id` that runs from yesterday until tomorrow.
pub fn current_subscription(user_id: &str, discount_percentage: f64) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: new_id(),
        user_id: user_id.to_string(),
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(1),
        discount_percentage,
    }
}
