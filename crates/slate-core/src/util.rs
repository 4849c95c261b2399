//! Small shared helpers.

/// Current wall-clock time as epoch milliseconds.
///
/// Every timestamp used for ordering or cursoring in Slate is a signed
/// 64-bit epoch-millisecond value; there is no other representation.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Next `updated_at` value after `prev`.
///
/// Mutations must bump `updated_at` strictly, even when two edits land
/// within the same millisecond.
#[must_use]
pub fn bump_timestamp(prev: i64) -> i64 {
    now_ms().max(prev + 1)
}
