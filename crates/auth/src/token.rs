use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{AccountClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccountClaims, TokenValidationError>;
}

/// HS256 shared-secret validator.
pub struct Hs256JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims with the same secret (dev tooling and tests).
    pub fn issue(&self, claims: &AccountClaims) -> Result<String, TokenValidationError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccountClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<AccountClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                TokenValidationError::Malformed(e.to_string())
            })?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shelfwatch_core::AccountId;

    #[test]
    fn issued_token_validates_with_same_secret() {
        let validator = Hs256JwtValidator::new("secret");
        let now = Utc::now();
        let account = AccountId::new();
        let token = validator
            .issue(&AccountClaims::new(account, now, Duration::minutes(5)))
            .unwrap();

        let claims = validator.validate(&token, now).unwrap();
        assert_eq!(claims.sub, account);
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let now = Utc::now();
        let token = Hs256JwtValidator::new("one")
            .issue(&AccountClaims::new(AccountId::new(), now, Duration::minutes(5)))
            .unwrap();

        let err = Hs256JwtValidator::new("two").validate(&token, now).unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let validator = Hs256JwtValidator::new("secret");
        let issued = Utc::now() - Duration::hours(2);
        let token = validator
            .issue(&AccountClaims::new(AccountId::new(), issued, Duration::hours(1)))
            .unwrap();

        assert_eq!(validator.validate(&token, Utc::now()), Err(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_is_rejected() {
        let validator = Hs256JwtValidator::new("secret");
        assert!(validator.validate("not.a.jwt", Utc::now()).is_err());
    }
}
