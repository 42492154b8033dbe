use axum::{extract::Request, http::StatusCode, response::IntoResponse, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::booking::{BookingEngine, SubscriptionLookup};
use crate::catalog::{CatalogStore, TheaterJoin};
use crate::db::SqliteRepository;
use crate::recommend::{PreferenceSource, RecommendationGateway};
use crate::reviews::ReviewStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqliteRepository>,
    pub catalog: Arc<CatalogStore>,
    pub bookings: Arc<BookingEngine>,
    pub reviews: Arc<ReviewStore>,
    pub recommendations: Arc<RecommendationGateway>,
}

impl AppState {
    /// Wire every component to its store handles.
    pub fn new(
        db: Arc<SqliteRepository>,
        preferences: Arc<dyn PreferenceSource>,
    ) -> Self {
        let catalog = Arc::new(CatalogStore::new(
            db.clone(),
            TheaterJoin::new(db.clone()),
        ));
        let bookings = Arc::new(BookingEngine::new(
            catalog.clone(),
            db.clone(),
            SubscriptionLookup::new(db.clone()),
            db.clone(),
        ));
        let reviews = Arc::new(ReviewStore::new(catalog.clone(), db.clone()));
        let recommendations = Arc::new(RecommendationGateway::new(preferences, catalog.clone()));

        Self {
            db,
            catalog,
            bookings,
            reviews,
            recommendations,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(crate::api::build_movies_router())
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    crate::api::ApiError::new(StatusCode::NOT_FOUND, format!("No route for {}", req.uri().path()))
        .into_response()
}
