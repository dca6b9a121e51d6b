use crate::ConfigError;

/// Fraction of the host memory budget given to the cache by default.
pub const DEFAULT_CACHE_FRACTION: f32 = 0.25;

/// Smallest accepted cache fraction (inclusive).
pub const MIN_CACHE_FRACTION: f32 = 0.05;

/// Largest accepted cache fraction (inclusive).
pub const MAX_CACHE_FRACTION: f32 = 0.8;

/// Computes the cache capacity as a fraction of a host-supplied byte budget.
///
/// The budget typically comes from the platform's reported heap class.
/// Fails fast if `fraction` is outside `[MIN_CACHE_FRACTION,
/// MAX_CACHE_FRACTION]`; both endpoints are accepted.
pub fn cache_budget_bytes(budget_bytes: usize, fraction: f32) -> Result<usize, ConfigError> {
    if !(MIN_CACHE_FRACTION..=MAX_CACHE_FRACTION).contains(&fraction) {
        return Err(ConfigError::new(format!(
            "cache fraction must be between {MIN_CACHE_FRACTION} and {MAX_CACHE_FRACTION} \
             (inclusive), got {fraction}"
        )));
    }
    Ok((fraction as f64 * budget_bytes as f64).round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fraction_of_budget() {
        let bytes = cache_budget_bytes(64 * 1024 * 1024, DEFAULT_CACHE_FRACTION).unwrap();
        assert_eq!(bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_endpoints_are_accepted() {
        assert!(cache_budget_bytes(1_000, MIN_CACHE_FRACTION).is_ok());
        assert!(cache_budget_bytes(1_000, MAX_CACHE_FRACTION).is_ok());
    }

    #[test]
    fn test_out_of_range_fractions_fail() {
        assert!(cache_budget_bytes(1_000, 0.04).is_err());
        assert!(cache_budget_bytes(1_000, 0.81).is_err());
        assert!(cache_budget_bytes(1_000, -0.1).is_err());
        let err = cache_budget_bytes(1_000, 1.5).unwrap_err();
        assert!(err.message().contains("fraction"));
    }
}
