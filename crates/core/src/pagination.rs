//! Limit/offset clamping for list endpoints.

/// Default page size when the caller gives none.
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
