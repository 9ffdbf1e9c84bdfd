use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shelfwatch_core::AccountId;

/// Token claims model (transport-agnostic).
///
/// The minimal set of claims expected once a token has been decoded and its
/// signature verified. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClaims {
    /// Subject: the account the bearer acts for.
    pub sub: AccountId,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expiration, Unix seconds.
    pub exp: i64,
}

impl AccountClaims {
    pub fn new(account_id: AccountId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: account_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate claims against `now`.
///
/// Signature verification / decoding happens in [`crate::token`].
pub fn validate_claims(claims: &AccountClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn accepts_inside_window() {
        let claims = AccountClaims::new(AccountId::new(), at(1_000), Duration::seconds(60));
        assert_eq!(validate_claims(&claims, at(1_030)), Ok(()));
    }

    #[test]
    fn rejects_outside_window() {
        let claims = AccountClaims::new(AccountId::new(), at(1_000), Duration::seconds(60));
        assert_eq!(validate_claims(&claims, at(999)), Err(TokenValidationError::NotYetValid));
        assert_eq!(validate_claims(&claims, at(1_060)), Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_inverted_window() {
        let claims = AccountClaims {
            sub: AccountId::new(),
            iat: 10,
            exp: 10,
        };
        assert_eq!(validate_claims(&claims, at(10)), Err(TokenValidationError::InvalidTimeWindow));
    }
}
