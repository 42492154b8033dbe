use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use super::model::*;
use super::repo::*;
use crate::util::{from_db_date, from_db_time, to_db_date, to_db_time};

type MovieRow = (String, String, String, Option<String>, f64);
type TheaterRow = (String, String, String, Option<f64>, String);
type ShowingRow = (String, String, String, Option<String>, Option<f64>);
type SubscriptionRow = (String, String, String, String, f64);
type BookingRow = (String, String, String, String, String, String, i64, f64, String);
type ReviewRow = (String, String, String, i32, Option<String>);

const MOVIE_COLUMNS: &str = "id, title, genre, release_date, ticket_price";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(
        db_path: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        let repo = Self { pool };

        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    pub async fn in_memory() -> DbResult<Self> {
        Self::in_memory_with_timeout(Duration::from_secs(30)).await
    }

    /// A private in-memory database. The pool holds exactly one connection that
    /// is never recycled, since closing it would discard the data.
    pub async fn in_memory_with_timeout(acquire_timeout: Duration) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Check out a connection and keep it until the guard is dropped.
    #[cfg(test)]
    pub(crate) async fn hold_connection(&self) -> sqlx::pool::PoolConnection<sqlx::Sqlite> {
        self.pool.acquire().await.unwrap()
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn movie_from_row(row: MovieRow) -> DbResult<Movie> {
    Ok(Movie {
        id: row.0,
        title: row.1,
        genre: row.2,
        release_date: row.3.as_deref().map(from_db_date).transpose()?,
        ticket_price: row.4,
    })
}

fn movies_from_rows(rows: Vec<MovieRow>) -> DbResult<Vec<Movie>> {
    rows.into_iter().map(movie_from_row).collect()
}

fn theater_from_row(row: TheaterRow) -> DbResult<Theater> {
    let movie_showtimes = serde_json::from_str(&row.4)
        .map_err(|e| DbError::Corrupt(format!("showtimes of theater {}: {}", row.0, e)))?;

    Ok(Theater {
        id: row.0,
        name: row.1,
        address: row.2,
        average_rating: row.3,
        movie_showtimes,
    })
}

fn subscription_from_row(row: SubscriptionRow) -> DbResult<Subscription> {
    Ok(Subscription {
        id: row.0,
        user_id: row.1,
        start_date: from_db_time(&row.2)?,
        end_date: from_db_time(&row.3)?,
        discount_percentage: row.4,
    })
}

fn booking_from_row(row: BookingRow) -> DbResult<Booking> {
    let status = BookingStatus::parse(&row.8)
        .ok_or_else(|| DbError::Corrupt(format!("booking {} has status {:?}", row.0, row.8)))?;

    Ok(Booking {
        id: row.0,
        user_id: row.1,
        movie_id: row.2,
        theater_id: row.3,
        showtime: row.4,
        booking_date: from_db_time(&row.5)?,
        number_of_tickets: row.6,
        total_amount: row.7,
        status,
    })
}

#[async_trait]
impl MovieRepo for SqliteRepository {
    async fn get_movie(&self, id: &str) -> DbResult<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {} FROM movies WHERE id = ?",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Movie not found: {}", id)))?;

        movie_from_row(row)
    }

    async fn count_movies(&self) -> DbResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_movies(&self, skip: i64, limit: i64) -> DbResult<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {} FROM movies ORDER BY rowid LIMIT ? OFFSET ?",
            MOVIE_COLUMNS
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        movies_from_rows(rows)
    }

    async fn find_movies(&self, filter: &MovieFilter) -> DbResult<Vec<Movie>> {
        let mut sql = format!("SELECT {} FROM movies WHERE 1 = 1", MOVIE_COLUMNS);
        if filter.title.is_some() {
            sql.push_str(" AND title = ?");
        }
        if filter.genre.is_some() {
            sql.push_str(" AND genre = ?");
        }
        if filter.release_date.is_some() {
            sql.push_str(" AND release_date = ?");
        }
        sql.push_str(" ORDER BY rowid");

        let mut query = sqlx::query_as::<_, MovieRow>(&sql);
        if let Some(ref title) = filter.title {
            query = query.bind(title);
        }
        if let Some(ref genre) = filter.genre {
            query = query.bind(genre);
        }
        if let Some(ref date) = filter.release_date {
            query = query.bind(to_db_date(date));
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(matches = rows.len(), "movie search");
        movies_from_rows(rows)
    }

    async fn find_movies_by_genres(&self, genres: &[String], limit: i64) -> DbResult<Vec<Movie>> {
        if genres.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; genres.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM movies WHERE genre IN ({}) ORDER BY rowid LIMIT ?",
            MOVIE_COLUMNS, placeholders
        );

        let mut query = sqlx::query_as::<_, MovieRow>(&sql);
        for genre in genres {
            query = query.bind(genre);
        }
        let rows = query.bind(limit).fetch_all(&self.pool).await?;

        movies_from_rows(rows)
    }

    async fn upsert_movie(&self, movie: &Movie) -> DbResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO movies (id, title, genre, release_date, ticket_price)
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&movie.id)
        .bind(&movie.title)
        .bind(&movie.genre)
        .bind(movie.release_date.as_ref().map(to_db_date))
        .bind(movie.ticket_price)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TheaterRepo for SqliteRepository {
    async fn get_theater(&self, id: &str) -> DbResult<Theater> {
        let row = sqlx::query_as::<_, TheaterRow>(
            "SELECT id, name, address, average_rating, movie_showtimes FROM theaters WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Theater not found: {}", id)))?;

        theater_from_row(row)
    }

    async fn theaters_showing(&self, movie_id: &str) -> DbResult<Vec<TheaterShowing>> {
        // json_each unwinds the embedded schedule into one row per showtime.
        let rows = sqlx::query_as::<_, ShowingRow>(
            "SELECT t.id, t.name, t.address, json_extract(s.value, '$.showtime'), t.average_rating
             FROM theaters t, json_each(t.movie_showtimes) s
             WHERE json_extract(s.value, '$.movie_id') = ?
             ORDER BY t.rowid, s.key",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TheaterShowing {
                theater_id: r.0,
                name: r.1,
                address: r.2,
                showtime: r.3.unwrap_or_default(),
                average_rating: r.4,
            })
            .collect())
    }

    async fn upsert_theater(&self, theater: &Theater) -> DbResult<()> {
        let showtimes = serde_json::to_string(&theater.movie_showtimes)
            .map_err(|e| DbError::Corrupt(format!("showtimes of theater {}: {}", theater.id, e)))?;

        sqlx::query(
            "INSERT OR REPLACE INTO theaters (id, name, address, average_rating, movie_showtimes)
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&theater.id)
        .bind(&theater.name)
        .bind(&theater.address)
        .bind(theater.average_rating)
        .bind(showtimes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepo for SqliteRepository {
    async fn find_active_subscription(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Subscription>> {
        let now = to_db_time(&now);

        // Overlapping windows: the best discount wins, then the latest start.
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT id, user_id, start_date, end_date, discount_percentage
             FROM subscriptions
             WHERE user_id = ? AND start_date <= ? AND end_date >= ?
             ORDER BY discount_percentage DESC, start_date DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(subscription_from_row).transpose()
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> DbResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO subscriptions
            (id, user_id, start_date, end_date, discount_percentage)
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&subscription.id)
        .bind(&subscription.user_id)
        .bind(to_db_time(&subscription.start_date))
        .bind(to_db_time(&subscription.end_date))
        .bind(subscription.discount_percentage)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BookingRepo for SqliteRepository {
    async fn get_booking(&self, id: &str) -> DbResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, movie_id, theater_id, showtime, booking_date,
             number_of_tickets, total_amount, status
             FROM bookings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Booking not found: {}", id)))?;

        booking_from_row(row)
    }

    async fn count_bookings(&self) -> DbResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_booking(&self, booking: &Booking) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO bookings
            (id, user_id, movie_id, theater_id, showtime, booking_date,
             number_of_tickets, total_amount, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.id)
        .bind(&booking.user_id)
        .bind(&booking.movie_id)
        .bind(&booking.theater_id)
        .bind(&booking.showtime)
        .bind(to_db_time(&booking.booking_date))
        .bind(booking.number_of_tickets)
        .bind(booking.total_amount)
        .bind(booking.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewRepo for SqliteRepository {
    async fn list_reviews_by_movie(&self, movie_id: &str) -> DbResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, movie_id, user_id, rating, feedback FROM reviews WHERE movie_id = ?",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Review {
                id: r.0,
                movie_id: r.1,
                user_id: r.2,
                rating: r.3,
                feedback: r.4,
            })
            .collect())
    }

    async fn insert_review(&self, review: &Review) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO reviews (id, movie_id, user_id, rating, feedback) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&review.id)
        .bind(&review.movie_id)
        .bind(&review.user_id)
        .bind(review.rating)
        .bind(&review.feedback)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccessTokenRepo for SqliteRepository {
    async fn get_token(&self, token: &str) -> DbResult<AccessToken> {
        let result = sqlx::query_as::<_, (String, String, Option<String>)>(
            "SELECT token, userid, created FROM accesstokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound("Token not found".to_string()))?;

        Ok(AccessToken {
            token: result.0,
            userid: result.1,
            created: result.2.as_deref().map(from_db_time).transpose()?,
        })
    }

    async fn upsert_token(&self, token: &AccessToken) -> DbResult<()> {
        sqlx::query("INSERT OR REPLACE INTO accesstokens (token, userid, created) VALUES (?, ?, ?)")
            .bind(&token.token)
            .bind(&token.userid)
            .bind(token.created.as_ref().map(to_db_time))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn close(&self) {
        self.pool.close().await;
        info!("Database closed");
    }
}
