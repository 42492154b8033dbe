use serde::{Deserialize, Serialize};

use crate::db::{Booking, Movie, Review};

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 8;

#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub data: Vec<Movie>,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    pub page_total: i64,
    pub status: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub movie_id: String,
    pub theater_id: String,
    pub showtime: String,
    pub number_of_tickets: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub message: String,
    pub booking: Booking,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub movie_id: String,
    pub user_id: String,
    pub rating: i32,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub review: Review,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}
