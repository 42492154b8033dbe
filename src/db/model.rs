use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub genre: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub ticket_price: f64,
}

/// One entry of a theater's schedule. The movie is referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub movie_id: String,
    pub showtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theater {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub movie_showtimes: Vec<Showtime>,
}

/// A theater flattened against a single matching showtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheaterShowing {
    #[serde(rename = "theaterId")]
    pub theater_id: String,
    pub name: String,
    pub address: String,
    pub showtime: String,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub discount_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Booked" => Some(BookingStatus::Booked),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub showtime: String,
    pub booking_date: DateTime<Utc>,
    #[serde(rename = "numberOfTickets")]
    pub number_of_tickets: i64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(rename = "movieId")]
    pub movie_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub rating: i32,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub userid: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

/// Exact-match movie filter. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("Timed out waiting for a database connection")]
    Timeout,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => DbError::Timeout,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::AlreadyExists(db.message().to_string())
            }
            _ => DbError::Sqlx(e),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
