use crate::error::{CoreError, CoreResult};

/// Total price of `ticket_count` tickets at `unit_price`, less an optional
/// percentage discount.
///
/// Inputs are validated, never clamped: a discount outside `[0, 100]` is a
/// caller bug and fails with `InvalidArgument`.
pub fn compute_total(unit_price: f64, ticket_count: i64, discount: Option<f64>) -> CoreResult<f64> {
    if ticket_count <= 0 {
        return Err(CoreError::invalid(format!(
            "number of tickets must be positive, got {}",
            ticket_count
        )));
    }
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(CoreError::invalid(format!(
            "ticket price must be non-negative, got {}",
            unit_price
        )));
    }

    let gross = unit_price * ticket_count as f64;

    match discount {
        None => Ok(gross),
        Some(pct) if (0.0..=100.0).contains(&pct) => Ok(gross * (100.0 - pct) / 100.0),
        Some(pct) => Err(CoreError::invalid(format!(
            "discount percentage must be within 0..=100, got {}",
            pct
        ))),
    }
}
