//! Utility functions and helpers

/// Calculate percentage change. `None` when the baseline is not a usable
/// reference price.
pub fn calculate_percentage_change(old_value: f64, new_value: f64) -> Option<f64> {
    if old_value > 0.0 && old_value.is_finite() && new_value.is_finite() {
        Some(((new_value - old_value) / old_value) * 100.0)
    } else {
        None
    }
}

/// Format a price with precision that scales with its magnitude, so that
/// sub-cent tokens still show significant digits.
pub fn format_price(price: f64) -> String {
    let abs = price.abs();
    if abs >= 1000.0 {
        format!("{:.2}", price)
    } else if abs >= 1.0 {
        format!("{:.4}", price)
    } else if abs >= 0.01 {
        format!("{:.6}", price)
    } else {
        format!("{:.10}", price)
    }
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
