/// Centralized environment-variable parsing helpers.
///
/// Every tuning knob the engine reads from the environment goes through
/// these helpers so the parsing rules live in one place.

/// Worker thread count
pub(crate) const THREADS_VAR: &str = "BLITKIT_THREADS";
/// Disables delegation to the host compositing primitive
pub(crate) const DISABLE_HOST_VAR: &str = "BLITKIT_DISABLE_HOST_SCALING";
/// Prefix of the per-algorithm split threshold variables
pub(crate) const SPLIT_THRESHOLD_PREFIX: &str = "BLITKIT_SPLIT_THRESHOLD_";

/// Returns `true` when the environment variable is set to a truthy value
/// (`1`, `true`, `yes`, or `on`, case-insensitive, trimmed).
#[inline]
pub(crate) fn env_var_truthy(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|raw| {
            let normalized = raw.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

/// Parses the environment variable as a `u64`, returning `Some` only when
/// the value is a valid positive (> 0) integer.
#[inline]
pub(crate) fn env_var_positive_u64(var_name: &str) -> Option<u64> {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
