pub mod gateway;
pub mod preferences;

pub use gateway::{RecommendationGateway, MAX_RECOMMENDATIONS};
pub use preferences::{HttpPreferenceClient, PreferenceError, PreferenceSource, UserPreferences};
