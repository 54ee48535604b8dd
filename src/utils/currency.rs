/// Currency utility functions for handling Rupee conversions
///
/// All monetary values are stored in paise (1 Rupee = 100 paise)
/// to avoid floating-point precision issues.

/// Convert Rupees to paise (multiply by 100)
pub fn rupees_to_paise(rupees: f64) -> i64 {
    (rupees * 100.0).round() as i64
}

/// Convert paise to Rupees (divide by 100)
pub fn paise_to_rupees(paise: i64) -> f64 {
    paise as f64 / 100.0
}

/// Format paise as a Rupee string with 2 decimal places
pub fn format_paise_as_rupees(paise: i64) -> String {
    format!("₹{:.2}", paise_to_rupees(paise))
}

/// `percent` of `amount`, rounded half up to the nearest paisa. `None` on
/// overflow.
pub fn percent_of(amount: i64, percent: i64) -> Option<i64> {
    amount
        .checked_mul(percent)?
        .checked_add(50)
        .map(|scaled| scaled / 100)
}
