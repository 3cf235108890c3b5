//! Signed access tokens.
//!
//! Tokens are `EdDSA` (Ed25519) JWTs. The `sub` claim is a [`PrincipalKey`]
//! in its `"<kind>:<id>"` form; `exp` is the only invalidation mechanism.
//! A codec built from the public key alone can verify but not issue.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use energy_maximum_core::PrincipalKey;

/// Errors from issuing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signature does not match the verifying key.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,

    /// The token is not a well-formed JWT or carries an unusable subject.
    #[error("token is malformed")]
    Malformed,

    /// Key material could not be decoded.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// The codec was built without a signing key.
    #[error("token codec has no signing key")]
    SigningUnavailable,

    /// Encoding the token failed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies access tokens.
///
/// Cheap to clone; keys are shared behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    inner: Arc<TokenCodecInner>,
}

struct TokenCodecInner {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec that can issue and verify, from PEM-encoded keys.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if either key is not an Ed25519 PEM.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_ed_pem(private_pem)
            .map_err(|e| TokenError::InvalidKey(format!("private key: {e}")))?;
        Self::build(Some(encoding), public_pem)
    }

    /// Build a verify-only codec from a PEM-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the key is not an Ed25519 PEM.
    pub fn verifier(public_pem: &[u8]) -> Result<Self, TokenError> {
        Self::build(None, public_pem)
    }

    /// Build a codec from base64-encoded PEM keys, as they appear in the environment.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if decoding fails at either layer.
    pub fn from_base64_pem(private_b64: &str, public_b64: &str) -> Result<Self, TokenError> {
        let private_pem = decode_base64(private_b64, "private key")?;
        let public_pem = decode_base64(public_b64, "public key")?;
        Self::from_pem(&private_pem, &public_pem)
    }

    fn build(encoding: Option<EncodingKey>, public_pem: &[u8]) -> Result<Self, TokenError> {
        let decoding = DecodingKey::from_ed_pem(public_pem)
            .map_err(|e| TokenError::InvalidKey(format!("public key: {e}")))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            inner: Arc::new(TokenCodecInner {
                encoding,
                decoding,
                validation,
            }),
        })
    }

    /// Whether this codec can issue tokens.
    #[must_use]
    pub fn can_issue(&self) -> bool {
        self.inner.encoding.is_some()
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::SigningUnavailable` for a verify-only codec, or
    /// `TokenError::Signing` if encoding fails.
    pub fn issue(&self, subject: &PrincipalKey, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Same as [`TokenCodec::issue`].
    pub fn issue_at(
        &self,
        subject: &PrincipalKey,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let iat = now.timestamp();
        self.sign(&Claims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = self
            .inner
            .encoding
            .as_ref()
            .ok_or(TokenError::SigningUnavailable)?;

        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), claims, key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, returning the subject.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidSignature`, `TokenError::Expired`, or
    /// `TokenError::Malformed`.
    pub fn verify(&self, token: &str) -> Result<PrincipalKey, TokenError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
                .map_err(|e| {
                    tracing::debug!(error = %e, "token verification failed");
                    match e.kind() {
                        ErrorKind::ExpiredSignature => TokenError::Expired,
                        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                        _ => TokenError::Malformed,
                    }
                })?;

        data.claims.sub.parse().map_err(|e| {
            tracing::debug!(error = %e, "token subject rejected");
            TokenError::Malformed
        })
    }
}

fn decode_base64(value: &str, what: &str) -> Result<Vec<u8>, TokenError> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| TokenError::InvalidKey(format!("{what} is not valid base64: {e}")))
}
