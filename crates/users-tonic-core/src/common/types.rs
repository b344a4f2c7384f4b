//! # Common User Types and Constants
//!
//! Shared aliases for the identifiers and timestamps carried in `User`
//! records, and the clock the store uses to stamp them.
//!
//! ## Type Aliases
//!
//! - [`UserId`] - The wire type of a user id (`int32` in the proto).
//! - [`Millis`] - Epoch-millisecond timestamps (`int64` in the proto).
//! - [`Clock`] - Monotonic clock used for `created_at`/`updated_at`.
//!
//! ## Constants
//!
//! - [`EPOCH`] - Zero point for [`Clock`]. The Unix epoch, so timestamps are
//!   plain epoch millis.
//! - [`FIRST_ALLOCATED_ID`] - First id handed out after the seed users.

use crate::proto::{User, UserStatus};
use ferroid::time::{MonotonicClock, TimeSource};

/// Identifier of a stored user.
pub type UserId = i32;

/// Milliseconds since [`EPOCH`].
pub type Millis = i64;

/// The clock used to stamp user timestamps.
///
/// [`MonotonicClock`] never goes backwards, so `updated_at` can only grow
/// across successive mutations of the same user.
pub type Clock = MonotonicClock;

/// Zero point for [`Clock`] readings.
pub const EPOCH: core::time::Duration = core::time::Duration::ZERO;

/// The id the sequence hands out first. Ids `1` and `2` belong to the seed
/// users.
pub const FIRST_ALLOCATED_ID: UserId = 3;

/// Reads `clock` as epoch milliseconds in the wire representation.
pub fn now_millis(clock: &Clock) -> Millis {
    let millis: u64 = clock.current_millis();
    Millis::try_from(millis).unwrap_or(Millis::MAX)
}

/// The two records every fresh store starts with.
pub fn seed_users(now: Millis) -> [User; 2] {
    [
        User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            age: 30,
            department: "Engineering".to_string(),
            status: UserStatus::Active.into(),
            created_at: now,
            updated_at: now,
        },
        User {
            id: 2,
            name: "Jane Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            age: 28,
            department: "Marketing".to_string(),
            status: UserStatus::Active.into(),
            created_at: now,
            updated_at: now,
        },
    ]
}
