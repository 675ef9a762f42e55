//! Display formatting helpers for billing UI.

use crate::limits::UNLIMITED;

/// Format a price in cents for display (e.g. `"$19.99"`), with zero
/// rendered as `"Free"`.
#[must_use]
pub fn format_price_cents(cents: i64) -> String {
    if cents <= 0 {
        return "Free".to_string();
    }
    format!("${:.2}", cents as f64 / 100.0)
}

/// Format a quota value, with `-1` rendered as `"Unlimited"`.
#[must_use]
pub fn format_limit(limit: i64) -> String {
    if limit == UNLIMITED {
        "Unlimited".to_string()
    } else {
        limit.to_string()
    }
}

/// Format usage against a quota, e.g. `"3 of 5"`.
///
/// Unlimited quotas show only the usage figure.
#[must_use]
pub fn format_quota(used: i64, limit: i64) -> String {
    if limit == UNLIMITED {
        used.to_string()
    } else {
        format!("{used} of {limit}")
    }
}

/// Format a size in megabytes, switching to GB at 1024 MB.
#[must_use]
pub fn format_storage_mb(mb: i64) -> String {
    if mb == UNLIMITED {
        return "Unlimited".to_string();
    }
    if mb >= 1024 {
        format!("{:.1} GB", mb as f64 / 1024.0)
    } else {
        format!("{mb} MB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price_cents(0), "Free");
        assert_eq!(format_price_cents(1_200), "$12.00");
        assert_eq!(format_price_cents(4_999), "$49.99");
        assert_eq!(format_price_cents(199_000), "$1990.00");
    }

    #[test]
    fn test_format_limit() {
        assert_eq!(format_limit(-1), "Unlimited");
        assert_eq!(format_limit(0), "0");
        assert_eq!(format_limit(25), "25");
    }

    #[test]
    fn test_format_quota() {
        assert_eq!(format_quota(3, 5), "3 of 5");
        assert_eq!(format_quota(3, -1), "3");
        assert_eq!(format_quota(0, 0), "0 of 0");
    }

    #[test]
    fn test_format_storage() {
        assert_eq!(format_storage_mb(512), "512 MB");
        assert_eq!(format_storage_mb(1024), "1.0 GB");
        assert_eq!(format_storage_mb(1536), "1.5 GB");
        assert_eq!(format_storage_mb(102_400), "100.0 GB");
        assert_eq!(format_storage_mb(-1), "Unlimited");
    }
}
