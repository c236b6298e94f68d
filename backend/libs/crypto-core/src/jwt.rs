/// Session token codec
///
/// Issues and verifies compact HS256 JWTs carrying `{sub, email, iat, exp}`.
///
/// ## Design
///
/// - **Injected secret**: the signing key is handed to [`TokenCodec::new`] once at
///   startup and never mutated; no process-global key storage.
/// - **Stateless**: verification consults nothing but the token and the clock.
/// - **Deterministic**: the same claims, secret and timestamp always produce the
///   same token, so fixtures can freeze the clock via [`TokenCodec::issue_at`].
/// - **Zero leeway**: a token whose `exp` has been reached is rejected.
///
/// ## Usage
///
/// ```rust
/// use chrono::Duration;
/// use crypto_core::jwt::TokenCodec;
/// use uuid::Uuid;
///
/// let codec = TokenCodec::new(b"change-me", Duration::hours(24));
/// let issued = codec
///     .issue(Uuid::new_v4(), "user@example.com", codec.default_ttl())
///     .unwrap();
/// let claims = codec.verify(&issued.token).unwrap();
/// assert_eq!(claims.email, "user@example.com");
/// ```
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default session lifetime when no override is configured
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Email address
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

// ============================================================================
// Codec
// ============================================================================

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token valid from now for `ttl`
    pub fn issue(
        &self,
        subject_id: Uuid,
        email: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject_id, email, ttl, Utc::now())
    }

    /// Sign a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject_id: Uuid,
        email: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature, structure and expiry against the current UTC time
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, structure and expiry against `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        // Expiry is checked below against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-unit-tests-only";

    fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    #[test]
    fn test_issue_produces_three_part_jwt() {
        let issued = codec()
            .issue(Uuid::new_v4(), "test@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(issued.token.matches('.').count(), 2);
    }

    #[test]
    fn test_verify_round_trip_claims() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let issued = codec
            .issue(user_id, "test@example.com", codec.default_ttl())
            .expect("Failed to issue token");

        let claims = codec.verify(&issued.token).expect("token should verify");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_HOURS * 3600);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let codec = codec();
        let issued = codec
            .issue(Uuid::new_v4(), "test@example.com", Duration::seconds(-1))
            .expect("Failed to issue token");

        assert_eq!(codec.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_evaluated_against_supplied_clock() {
        let codec = codec();
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let issued = codec
            .issue_at(Uuid::new_v4(), "a@b.co", Duration::minutes(5), issued_at)
            .unwrap();

        assert!(codec
            .verify_at(&issued.token, issued_at + Duration::minutes(4))
            .is_ok());
        assert_eq!(
            codec.verify_at(&issued.token, issued_at + Duration::minutes(5)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_frozen_clock_is_deterministic() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let a = codec.issue_at(user_id, "a@b.co", Duration::hours(1), now).unwrap();
        let b = codec.issue_at(user_id, "a@b.co", Duration::hours(1), now).unwrap();
        assert_eq!(a.token, b.token);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = codec()
            .issue(Uuid::new_v4(), "test@example.com", Duration::hours(1))
            .unwrap();

        let other = TokenCodec::new(b"a-completely-different-secret", Duration::hours(1));
        assert!(matches!(
            other.verify(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let issued = codec
            .issue(Uuid::new_v4(), "test@example.com", Duration::hours(1))
            .unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged = codec
            .issue(Uuid::new_v4(), "attacker@example.com", Duration::hours(1))
            .unwrap();
        let forged_payload = forged.token.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;

        let spliced = parts.join(".");
        assert!(matches!(codec.verify(&spliced), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = codec();
        assert!(matches!(
            codec.verify("invalid.token.here"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(codec.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expires_at_matches_exp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let issued = codec()
            .issue_at(Uuid::new_v4(), "a@b.co", Duration::hours(2), now)
            .unwrap();
        assert_eq!(issued.claims.expires_at(), now + Duration::hours(2));
    }
}
