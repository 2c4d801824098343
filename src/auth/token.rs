//! Defines the token stored in the auth cookie and how it is serialized.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

/// A token for authorization and authentication.
///
/// The token is serialized as JSON and stored in a private cookie, so the
/// client can neither read nor forge it.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Create a token for `user_id` that expires `duration` from now.
    pub fn new(user_id: UserID, duration: Duration) -> Self {
        Self {
            user_id,
            expires_at: OffsetDateTime::now_utc() + duration,
        }
    }

    /// Whether the token has expired at the time `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
