pub mod engine;
pub mod pricing;
pub mod subscription;

pub use engine::BookingEngine;
pub use pricing::compute_total;
pub use subscription::SubscriptionLookup;
