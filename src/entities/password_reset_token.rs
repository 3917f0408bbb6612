//! PasswordResetToken entity - Token monouso per il reset della password

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub token: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    /// Un token è utilizzabile se non è scaduto e non è già stato consumato
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in_minutes: i64, used: bool) -> PasswordResetToken {
        let now = Utc::now();
        PasswordResetToken {
            token: "a".repeat(64),
            user_id: 1,
            expires_at: now + Duration::minutes(expires_in_minutes),
            used_at: used.then_some(now),
        }
    }

    #[test]
    fn test_fresh_token_is_usable() {
        assert!(token(30, false).is_usable(Utc::now()));
    }

    #[test]
    fn test_expired_or_used_token_is_not_usable() {
        assert!(!token(-1, false).is_usable(Utc::now()));
        assert!(!token(30, true).is_usable(Utc::now()));
    }
}
