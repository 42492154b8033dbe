pub mod auth;
pub mod error;
pub mod handlers;
pub mod types;

pub use auth::AuthUser;
pub use error::ApiError;
pub use handlers::*;
pub use types::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

pub fn build_movies_router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/movie/:movie_id", get(get_movie_details))
        .route("/movies/search", get(search_movies))
        .route("/movies/recommendations", get(get_recommendations))
        .route("/movies/bookings", post(make_booking))
        .route(
            "/movies/reviews/:movie_id",
            get(get_movie_reviews).post(submit_movie_review),
        )
}
