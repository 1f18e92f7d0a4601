//! Bearer token verification (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies an encoded bearer token into claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Shared-secret HS256 validator.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign `claims` with the shared secret.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenValidationError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        // The time window is checked against the caller's clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::UserId;
    use chrono::Duration;

    use crate::{Permission, Principal};

    #[test]
    fn issued_tokens_verify_with_the_same_secret() {
        let v = Hs256JwtValidator::new("secret");
        let now = Utc::now();
        let principal = Principal::user(UserId::new()).with_permission(Permission::ADD_BLOG);
        let token = v
            .issue(&JwtClaims::for_principal(&principal, now, Duration::minutes(5)))
            .unwrap();

        let claims = v.validate(&token, now).unwrap();
        assert_eq!(claims.into_principal(), principal);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_malformed() {
        let now = Utc::now();
        let token = Hs256JwtValidator::new("one")
            .issue(&JwtClaims::for_principal(
                &Principal::user(UserId::new()),
                now,
                Duration::minutes(5),
            ))
            .unwrap();

        assert!(matches!(
            Hs256JwtValidator::new("two").validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected_after_signature_check() {
        let v = Hs256JwtValidator::new("secret");
        let now = Utc::now();
        let token = v
            .issue(&JwtClaims::for_principal(
                &Principal::user(UserId::new()),
                now,
                Duration::minutes(1),
            ))
            .unwrap();

        assert_eq!(
            v.validate(&token, now + Duration::minutes(2)),
            Err(TokenValidationError::Expired)
        );
    }
}
