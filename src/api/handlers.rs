use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::auth::AuthUser;
use super::error::ApiError;
use super::types::*;
use crate::catalog::MovieWithTheaters;
use crate::db::{Movie, MovieFilter};
use crate::server::AppState;

pub async fn list_movies(
    State(state): State<AppState>,
    params: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let Query(params) = params?;
    let skip = params.skip.unwrap_or(DEFAULT_SKIP);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let page = state.catalog.list_movies(skip, limit).await?;

    Ok(Json(MovieListResponse {
        data: page.items,
        current_page: page.current_page,
        page_total: page.page_total,
        status: StatusCode::OK.as_u16(),
    }))
}

pub async fn get_movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Json<MovieWithTheaters>, ApiError> {
    let details = state.catalog.get_movie_with_theaters(&movie_id).await?;
    Ok(Json(details))
}

pub async fn search_movies(
    State(state): State<AppState>,
    filter: Result<Query<MovieFilter>, QueryRejection>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let Query(filter) = filter?;
    let movies = state.catalog.search_movies(filter).await?;
    Ok(Json(movies))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    params: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let Query(params) = params?;
    let movies = state.recommendations.recommend(&params.user_id).await?;
    Ok(Json(movies))
}

pub async fn make_booking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    params: Result<Query<BookingQuery>, QueryRejection>,
) -> Result<Json<BookingResponse>, ApiError> {
    let Query(params) = params?;
    let booking = state
        .bookings
        .create_booking(
            &user_id,
            &params.movie_id,
            &params.theater_id,
            &params.showtime,
            params.number_of_tickets,
        )
        .await
        .map_err(ApiError::not_found_as_bad_request)?;

    Ok(Json(BookingResponse {
        message: "Booking successful".to_string(),
        booking,
    }))
}

/// The review is filed under the path's movie id and the caller's identity;
/// the ids in the body are only checked for presence.
pub async fn submit_movie_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<String>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Json(req) = body?;

    if req.movie_id.is_empty() || req.user_id.is_empty() {
        return Err(ApiError::bad_request("movieId and userId are required"));
    }

    let review = state
        .reviews
        .submit_review(&user_id, &movie_id, req.rating, req.feedback)
        .await
        .map_err(ApiError::not_found_as_bad_request)?;

    Ok(Json(ReviewResponse {
        message: "Review submitted successfully".to_string(),
        review,
    }))
}

pub async fn get_movie_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let reviews = state
        .reviews
        .get_reviews(&movie_id)
        .await
        .map_err(ApiError::not_found_as_bad_request)?;

    Ok(Json(ReviewsResponse { reviews }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::{AccessToken, AccessTokenRepo, MovieRepo, Showtime, SqliteRepository, TheaterRepo};
    use crate::recommend::{PreferenceError, PreferenceSource, UserPreferences};
    use crate::server::{build_router, AppState};
    use crate::testutil::{movie, repo, theater};

    struct LikesDrama;

    #[async_trait]
    impl PreferenceSource for LikesDrama {
        async fn get_user_preferences(&self, user_id: &str) -> Result<UserPreferences, PreferenceError> {
            if user_id == "offline" {
                return Err(PreferenceError::Transport("connection refused".to_string()));
            }
            Ok(UserPreferences {
                viewing_habits: ["Drama".to_string()].into_iter().collect(),
            })
        }
    }

    async fn app() -> (Router, Arc<SqliteRepository>) {
        let repo = repo().await;
        repo.upsert_token(&AccessToken {
            token: "secret-token".to_string(),
            userid: "judy".to_string(),
            created: None,
        })
        .await
        .unwrap();

        let state = AppState::new(repo.clone(), Arc::new(LikesDrama));
        (build_router(state), repo)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_list_movies_defaults() {
        let (app, repo) = app().await;
        for i in 0..10 {
            repo.upsert_movie(&movie(&format!("M{}", i), "Drama", 5.0))
                .await
                .unwrap();
        }

        let (status, body) = call(&app, Method::GET, "/movies", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 8);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["page_total"], 2);
        assert_eq!(body["status"], 200);

        let (_, body) = call(&app, Method::GET, "/movies?skip=8&limit=8", None, None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["currentPage"], 2);
    }

    #[tokio::test]
    async fn test_list_movies_with_huge_limit() {
        let (app, repo) = app().await;
        repo.upsert_movie(&movie("Alien", "Sci-Fi", 5.0)).await.unwrap();
        repo.upsert_movie(&movie("Aliens", "Sci-Fi", 5.0)).await.unwrap();

        let uri = format!("/movies?limit={}", i64::MAX);
        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["page_total"], 1);
    }

    #[tokio::test]
    async fn test_malformed_query_gives_json_error() {
        let (app, _) = app().await;

        let (status, body) = call(&app, Method::GET, "/movies?limit=many", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());

        let (status, body) = call(&app, Method::GET, "/movies/recommendations", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("userId"));

        let uri = "/movies/bookings?movieId=a&theaterId=b&showtime=c&numberOfTickets=abc";
        let (status, body) = call(&app, Method::POST, uri, Some("secret-token"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_busy_store_answers_gateway_timeout() {
        let repo = Arc::new(
            SqliteRepository::in_memory_with_timeout(std::time::Duration::from_millis(100))
                .await
                .unwrap(),
        );
        let app = build_router(AppState::new(repo.clone(), Arc::new(LikesDrama)));
        let _held = repo.hold_connection().await;

        let (status, body) = call(&app, Method::GET, "/movies", None, None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["status"], 504);
    }

    #[tokio::test]
    async fn test_movie_details() {
        let (app, repo) = app().await;
        let m = movie("Casablanca", "Drama", 6.0);
        repo.upsert_movie(&m).await.unwrap();
        let mut t = theater("Ritz");
        t.movie_showtimes.push(Showtime {
            movie_id: m.id.clone(),
            showtime: "20:00".to_string(),
        });
        repo.upsert_theater(&t).await.unwrap();

        let uri = format!("/movies/movie/{}", m.id);
        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Casablanca");
        assert_eq!(body["theaters"][0]["theaterId"], t.id.as_str());
        assert_eq!(body["theaters"][0]["showtime"], "20:00");

        let (status, _) = call(&app, Method::GET, "/movies/movie/xyz", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_requires_filter() {
        let (app, repo) = app().await;
        repo.upsert_movie(&movie("Heat", "Crime", 6.0)).await.unwrap();

        let (status, body) = call(&app, Method::GET, "/movies/search", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (status, body) = call(&app, Method::GET, "/movies/search?genre=Crime", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recommendations() {
        let (app, repo) = app().await;
        for i in 0..7 {
            repo.upsert_movie(&movie(&format!("D{}", i), "Drama", 5.0))
                .await
                .unwrap();
        }
        repo.upsert_movie(&movie("Saw", "Horror", 5.0)).await.unwrap();

        let uri = "/movies/recommendations?userId=judy";
        let (status, body) = call(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        let movies = body.as_array().unwrap();
        assert_eq!(movies.len(), 5);
        assert!(movies.iter().all(|m| m["genre"] == "Drama"));

        let uri = "/movies/recommendations?userId=offline";
        let (status, _) = call(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_booking_requires_token() {
        let (app, _) = app().await;
        let uri = "/movies/bookings?movieId=a&theaterId=b&showtime=c&numberOfTickets=1";

        let (status, _) = call(&app, Method::POST, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::POST, uri, Some("wrong"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_booking_flow() {
        let (app, repo) = app().await;
        let m = movie("Vertigo", "Thriller", 9.5);
        let t = theater("Plaza");
        repo.upsert_movie(&m).await.unwrap();
        repo.upsert_theater(&t).await.unwrap();

        let uri = format!(
            "/movies/bookings?movieId={}&theaterId={}&showtime=18:30&numberOfTickets=2",
            m.id, t.id
        );
        let (status, body) = call(&app, Method::POST, &uri, Some("secret-token"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Booking successful");
        assert_eq!(body["booking"]["user_id"], "judy");
        assert_eq!(body["booking"]["totalAmount"], 19.0);
        assert_eq!(body["booking"]["status"], "Booked");

        let uri = format!(
            "/movies/bookings?movieId={}&theaterId={}&showtime=18:30&numberOfTickets=2",
            m.id,
            crate::util::new_id()
        );
        let (status, _) = call(&app, Method::POST, &uri, Some("secret-token"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_review_flow() {
        let (app, repo) = app().await;
        let m = movie("Amelie", "Romance", 7.0);
        repo.upsert_movie(&m).await.unwrap();
        let uri = format!("/movies/reviews/{}", m.id);

        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some("secret-token"),
            Some(json!({ "movieId": m.id, "userId": "judy", "rating": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some("secret-token"),
            Some(json!({ "movieId": m.id, "rating": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some("secret-token"),
            Some(json!({ "movieId": m.id, "userId": "judy", "rating": 5, "feedback": "Charming" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Review submitted successfully");
        assert_eq!(body["review"]["userId"], "judy");

        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reviews"][0]["rating"], 5);
        assert_eq!(body["reviews"][0]["feedback"], "Charming");

        let (status, _) = call(
            &app,
            Method::GET,
            &format!("/movies/reviews/{}", crate::util::new_id()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
