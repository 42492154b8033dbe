use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::db::SubscriptionRepo;
use crate::error::CoreResult;

pub struct SubscriptionLookup {
    subscriptions: Arc<dyn SubscriptionRepo>,
}

impl SubscriptionLookup {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepo>) -> Self {
        Self { subscriptions }
    }

    /// Discount percentage of the user's subscription active at `now`, if any.
    /// When windows overlap the store picks the best discount.
    pub async fn active_discount(&self, user_id: &str, now: DateTime<Utc>) -> CoreResult<Option<f64>> {
        let active = self
            .subscriptions
            .find_active_subscription(user_id, now)
            .await?;

        if let Some(ref sub) = active {
            debug!(user_id, subscription = %sub.id, discount = sub.discount_percentage, "active subscription");
        }

        Ok(active.map(|sub| sub.discount_percentage))
    }
}
