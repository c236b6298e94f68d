/// Integration tests for crypto-core session tokens
///
/// This test module covers:
/// - Token issuance and verification through the public API
/// - Expiry with arbitrary TTLs
/// - Secret isolation between codec instances
use chrono::{Duration, TimeZone, Utc};
use crypto_core::{TokenCodec, TokenError};
use uuid::Uuid;

fn codec_with(secret: &str, ttl_hours: i64) -> TokenCodec {
    TokenCodec::new(secret.as_bytes(), Duration::hours(ttl_hours))
}

#[test]
fn test_configured_ttl_is_applied() {
    let codec = codec_with("integration-secret", 3);
    let issued = codec
        .issue(Uuid::new_v4(), "ttl@example.com", codec.default_ttl())
        .expect("Failed to issue token");

    assert_eq!(issued.claims.exp - issued.claims.iat, 3 * 3600);
}

#[test]
fn test_arbitrary_ttl_overrides_default() {
    let codec = codec_with("integration-secret", 24);
    let issued = codec
        .issue(Uuid::new_v4(), "ttl@example.com", Duration::seconds(90))
        .expect("Failed to issue token");

    assert_eq!(issued.claims.exp - issued.claims.iat, 90);
    assert!(codec.verify(&issued.token).is_ok());
}

#[test]
fn test_already_expired_token_fails_verification() {
    let codec = codec_with("integration-secret", 24);
    let issued = codec
        .issue(Uuid::new_v4(), "late@example.com", Duration::seconds(-1))
        .expect("Failed to issue token");

    let err = codec.verify(&issued.token).unwrap_err();
    assert_eq!(err, TokenError::Expired);
    assert!(err.to_string().contains("expired"));
}

#[test]
fn test_distinct_secrets_do_not_cross_verify() {
    let alpha = codec_with("alpha-secret", 1);
    let beta = codec_with("beta-secret", 1);

    let token = alpha
        .issue(Uuid::new_v4(), "x@example.com", Duration::hours(1))
        .unwrap()
        .token;

    assert!(alpha.verify(&token).is_ok());
    assert!(matches!(beta.verify(&token), Err(TokenError::Invalid(_))));
}

#[test]
fn test_frozen_clock_fixture() {
    let codec = codec_with("fixture-secret", 24);
    let subject = Uuid::parse_str("6f1c2a5e-3b1d-4c1e-9a43-0d8a2b7f5e10").unwrap();
    let frozen = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let first = codec
        .issue_at(subject, "frozen@example.com", Duration::hours(24), frozen)
        .unwrap();
    let second = codec
        .issue_at(subject, "frozen@example.com", Duration::hours(24), frozen)
        .unwrap();

    assert_eq!(first.token, second.token);
    let claims = codec
        .verify_at(&first.token, frozen + Duration::hours(1))
        .unwrap();
    assert_eq!(claims.sub, subject.to_string());
    assert_eq!(claims.iat, frozen.timestamp());
}
