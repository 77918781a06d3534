//! Clock port for expiry checks and login labels

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Token expiry is always judged against this clock, so tests can pin
/// "now" to either side of a token's expiry.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
