use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's id.
    pub sub: Uuid,
    /// Issued-at timestamp, seconds since epoch.
    pub iat: i64,
    /// Expiration timestamp, seconds since epoch. Always `iat` + one hour.
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// The signing keys are derived once from the configured secret; nothing
/// here touches the environment after construction. Every token is valid
/// for exactly one hour from issuance.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> TokenIssuer {
        let mut validation = Validation::new(Algorithm::HS256);
        // The crate's default 60s leeway would stretch the one-hour window;
        // expiry here is exact.
        validation.leeway = 0;

        TokenIssuer {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a one-hour token for `user_id`.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(chrono::Duration::hours(1))
            .expect("valid timestamp");

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Expired, forged, and malformed tokens all collapse into the same
    /// `Unauthorized` error; callers cannot tell which check failed. The
    /// underlying reason is still logged at debug level.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                AppError::Unauthorized("invalid token".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret")
    }

    // Signs claims directly, bypassing `issue`, to craft tokens at arbitrary
    // points in their lifetime or under a different secret.
    fn sign_issued_at(issued_at: DateTime<Utc>, secret: &[u8], user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(1)).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issuer().issue(user_id).unwrap();
        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_token_lifetime_is_one_hour() {
        let token = issuer().issue(Uuid::new_v4()).unwrap();
        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = issuer().issue(Uuid::new_v4()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_token_just_inside_the_window_is_accepted() {
        let issued = Utc::now() - Duration::minutes(59);
        let token = sign_issued_at(issued, b"test-secret", Uuid::new_v4());
        assert!(issuer().verify(&token).is_ok());
    }

    #[test]
    fn test_token_just_past_the_window_is_rejected() {
        // One minute past expiry sits inside the default 60s leeway; this
        // only passes because the issuer pins leeway to zero.
        let issued = Utc::now() - Duration::minutes(61);
        let token = sign_issued_at(issued, b"test-secret", Uuid::new_v4());
        assert!(issuer().verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = sign_issued_at(issued, b"test-secret", Uuid::new_v4());
        let error = issuer().verify(&token).unwrap_err();
        assert!(matches!(error, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_token_signed_with_another_secret_is_rejected() {
        let token = sign_issued_at(Utc::now(), b"some-other-secret", Uuid::new_v4());
        assert!(issuer().verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        assert!(issuer().verify("not.a.token").is_err());
        assert!(issuer().verify("").is_err());
    }

    #[test]
    fn test_every_rejection_reads_the_same() {
        let expired = sign_issued_at(Utc::now() - Duration::hours(2), b"test-secret", Uuid::new_v4());
        let forged = sign_issued_at(Utc::now(), b"wrong-secret", Uuid::new_v4());

        let messages: Vec<String> = [expired.as_str(), forged.as_str(), "garbage"]
            .iter()
            .map(|token| issuer().verify(token).unwrap_err().to_string())
            .collect();

        assert_eq!(messages[0], messages[1]);
        assert_eq!(messages[1], messages[2]);
    }
}
