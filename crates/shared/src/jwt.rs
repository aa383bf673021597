//! JWT token utilities using HS256 signing.
//!
//! Tokens carry the user's email as subject plus issued-at and expiry
//! timestamps. The signing secret comes base64-encoded from configuration
//! and must decode to at least 32 bytes; anything shorter is rejected when
//! the config is built, not at request time.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Secret is not valid base64: {0}")]
    InvalidSecret(String),

    #[error("Secret too short: {0} bytes after decoding, need at least {MIN_SECRET_BYTES}")]
    SecretTooShort(usize),

    #[error("Failed to encode token: {0}")]
    EncodingError(String),
}

/// Minimum decoded secret length for HMAC-SHA256 strength.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Configuration for JWT token issuance and verification.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds.
    pub expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JwtConfig from a base64-encoded secret.
    ///
    /// Fails if the secret is not valid base64 or decodes to fewer than
    /// 32 bytes. Call this once at startup so a weak secret aborts the
    /// process instead of surfacing per request.
    pub fn from_base64_secret(
        secret_b64: &str,
        expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let key_bytes = STANDARD
            .decode(secret_b64.trim())
            .map_err(|e| JwtError::InvalidSecret(e.to_string()))?;

        if key_bytes.len() < MIN_SECRET_BYTES {
            return Err(JwtError::SecretTooShort(key_bytes.len()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a signed token with the given email as subject.
    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Verifies a token and returns its subject.
    ///
    /// Returns `None` on any structural, signature, or expiry failure.
    /// Callers treat `None` as "unauthenticated", never as a server fault.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn test_secret() -> String {
        // 48 raw bytes, comfortably above the minimum
        STANDARD.encode(b"quadra-test-secret-key-0123456789-abcdefghijklmn")
    }

    fn create_test_config() -> JwtConfig {
        JwtConfig::from_base64_secret(&test_secret(), 3600, 0).unwrap()
    }

    #[test]
    fn test_issue_produces_three_part_token() {
        let config = create_test_config();
        let token = config.issue("ana@example.com").unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_verify_roundtrip_returns_email() {
        let config = create_test_config();
        let token = config.issue("ana@example.com").unwrap();

        assert_eq!(config.verify(&token).as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_verify_expired_token_returns_none() {
        let mut config = create_test_config();
        config.expiry_secs = -10; // already expired at issuance

        let token = config.issue("ana@example.com").unwrap();
        assert!(config.verify(&token).is_none());
    }

    #[test]
    fn test_leeway_tolerates_recent_expiry() {
        let mut config = create_test_config();
        config.expiry_secs = -10;
        config.leeway_secs = 60;

        let token = config.issue("ana@example.com").unwrap();
        assert_eq!(config.verify(&token).as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_verify_garbage_returns_none() {
        let config = create_test_config();

        assert!(config.verify("not_a_jwt").is_none());
        assert!(config.verify("a.b.c").is_none());
        assert!(config.verify("").is_none());
    }

    #[test]
    fn test_verify_tampered_signature_returns_none() {
        let config = create_test_config();
        let token = config.issue("ana@example.com").unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let tampered = parts.join(".");

        assert!(config.verify(&tampered).is_none());
    }

    #[test]
    fn test_verify_token_from_other_secret_returns_none() {
        let config = create_test_config();
        let other = JwtConfig::from_base64_secret(
            &STANDARD.encode(b"another-secret-key-9876543210-zyxwvutsrqponml!"),
            3600,
            0,
        )
        .unwrap();

        let token = other.issue("ana@example.com").unwrap();
        assert!(config.verify(&token).is_none());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let short = STANDARD.encode(b"too-short");
        let result = JwtConfig::from_base64_secret(&short, 3600, 0);

        assert!(matches!(result, Err(JwtError::SecretTooShort(9))));
    }

    #[test]
    fn test_invalid_base64_secret_is_rejected() {
        let result = JwtConfig::from_base64_secret("not base64 !!!", 3600, 0);
        assert!(matches!(result, Err(JwtError::InvalidSecret(_))));
    }

    #[test]
    fn test_claims_timestamps() {
        let config = create_test_config();
        let before = Utc::now().timestamp();
        let token = config.issue("ana@example.com").unwrap();
        let after = Utc::now().timestamp();

        // Decode without the config to inspect raw claims
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let key_bytes = STANDARD.decode(test_secret()).unwrap();
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(&key_bytes), &validation)
            .expect("token should decode");

        assert!(data.claims.iat >= before && data.claims.iat <= after);
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn test_jwt_error_display() {
        assert!(format!("{}", JwtError::SecretTooShort(9)).contains("32"));
        assert!(format!("{}", JwtError::InvalidSecret("bad".into())).contains("base64"));
    }
}
