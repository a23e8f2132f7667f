//! JWT service for token generation and validation
//!
//! Tokens carry the principal's email as their identity claim (`sub`) and a
//! unique `jti` used as the revocation key. Roles are not embedded; services
//! resolve them from the store on every request.
//!
//! Two key setups are supported: a shared HS256 secret, or an RS256 key pair
//! where validation-only services need just the public key.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::{TokenError, TokenResult};

/// Default access token lifetime: one day
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: u64 = 86_400;
/// Default refresh token lifetime: thirty days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: u64 = 2_592_000;

/// Key material used to sign and verify tokens
#[derive(Debug, Clone)]
pub enum JwtKeys {
    /// Shared secret, HS256
    Secret(String),
    /// PEM encoded RSA keys, RS256. The private key is optional for services
    /// that only validate.
    Rsa {
        private_key: Option<String>,
        public_key: String,
    },
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub keys: JwtKeys,
    /// Access token expiration time in seconds
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Build a configuration around a shared secret with default expiries
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            keys: JwtKeys::Secret(secret.into()),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }

    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: shared HS256 secret; takes precedence when set
    /// - `JWT_PRIVATE_KEY`: RS256 private key (PEM or path to a PEM file), optional
    /// - `JWT_PUBLIC_KEY`: RS256 public key (PEM or path to a PEM file)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 2592000)
    pub fn from_env() -> TokenResult<Self> {
        let keys = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => JwtKeys::Secret(secret),
            _ => {
                let public_key = std::env::var("JWT_PUBLIC_KEY").map_err(|_| {
                    TokenError::Configuration(
                        "neither JWT_SECRET nor JWT_PUBLIC_KEY is set".to_string(),
                    )
                })?;
                let private_key = std::env::var("JWT_PRIVATE_KEY")
                    .ok()
                    .map(|value| read_pem(&value))
                    .transpose()?;

                JwtKeys::Rsa {
                    private_key,
                    public_key: read_pem(&public_key)?,
                }
            }
        };

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REFRESH_TOKEN_EXPIRY);

        Ok(JwtConfig {
            keys,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// Accept either inline PEM or a path to a PEM file
fn read_pem(value: &str) -> TokenResult<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .map(|pem| pem.trim().to_string())
        .map_err(|e| TokenError::Configuration(format!("Failed to read key file {}: {}", value, e)))
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity claim: the user's email
    pub sub: String,
    /// Token ID, unique per issued token
    pub jti: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

impl TokenType {
    fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
    refresh_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> TokenResult<Self> {
        let (algorithm, encoding_key, decoding_key) = match &config.keys {
            JwtKeys::Secret(secret) => (
                Algorithm::HS256,
                Some(EncodingKey::from_secret(secret.as_bytes())),
                DecodingKey::from_secret(secret.as_bytes()),
            ),
            JwtKeys::Rsa {
                private_key,
                public_key,
            } => {
                let encoding_key = private_key
                    .as_ref()
                    .map(|pem| EncodingKey::from_rsa_pem(pem.as_bytes()))
                    .transpose()
                    .map_err(|e| TokenError::Configuration(e.to_string()))?;
                let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
                    .map_err(|e| TokenError::Configuration(e.to_string()))?;
                (Algorithm::RS256, encoding_key, decoding_key)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        })
    }

    fn now() -> TokenResult<u64> {
        Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
    }

    fn issue(&self, identity: &str, token_type: TokenType, lifetime: u64) -> TokenResult<String> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or(TokenError::IssuanceDisabled)?;
        let now = Self::now()?;

        let claims = Claims {
            sub: identity.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime,
            token_type,
        };

        Ok(encode(&Header::new(self.algorithm), &claims, encoding_key)?)
    }

    /// Generate an access token for the given identity (email)
    pub fn generate_access_token(&self, identity: &str) -> TokenResult<String> {
        self.issue(identity, TokenType::Access, self.access_token_expiry)
    }

    /// Generate a refresh token for the given identity (email)
    pub fn generate_refresh_token(&self, identity: &str) -> TokenResult<String> {
        self.issue(identity, TokenType::Refresh, self.refresh_token_expiry)
    }

    /// Validate a token's signature and expiry and return the claims
    pub fn validate_token(&self, token: &str) -> TokenResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require a specific token type
    pub fn validate_typed(&self, token: &str, expected: TokenType) -> TokenResult<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected: expected.as_str(),
            });
        }
        Ok(claims)
    }

    /// Seconds until the claims expire, zero if already past
    pub fn remaining_lifetime(&self, claims: &Claims) -> TokenResult<u64> {
        Ok(claims.exp.saturating_sub(Self::now()?))
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.refresh_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::with_secret("test-secret")).unwrap()
    }

    #[test]
    fn test_access_token_round_trip_keeps_identity() {
        let jwt = service();
        let token = jwt.generate_access_token("a@b.com").unwrap();

        let claims = jwt.validate_typed(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.exp - claims.iat, DEFAULT_ACCESS_TOKEN_EXPIRY);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = service();
        let token = jwt.generate_refresh_token("a@b.com").unwrap();

        let err = jwt.validate_typed(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, TokenError::WrongType { expected: "access" }));
    }

    #[test]
    fn test_tokens_issued_in_the_same_second_differ() {
        let jwt = service();
        let first = jwt.generate_refresh_token("a@b.com").unwrap();
        let second = jwt.generate_refresh_token("a@b.com").unwrap();

        assert_ne!(first, second);
        assert_ne!(
            jwt.validate_token(&first).unwrap().jti,
            jwt.validate_token(&second).unwrap().jti
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(JwtConfig::with_secret("other-secret")).unwrap();
        let token = other.generate_access_token("a@b.com").unwrap();

        assert!(matches!(
            service().validate_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = JwtConfig::with_secret("test-secret");
        config.access_token_expiry = 0;
        let jwt = JwtService::new(config).unwrap();
        let token = jwt.generate_access_token("a@b.com").unwrap();

        // exp == iat is already in the past once the clock ticks
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(jwt.validate_token(&token).is_err());
    }

    #[test]
    fn test_malformed_rsa_public_key_is_configuration_error() {
        let config = JwtConfig {
            keys: JwtKeys::Rsa {
                private_key: None,
                public_key: "not a pem".to_string(),
            },
            access_token_expiry: 60,
            refresh_token_expiry: 60,
        };

        assert!(matches!(
            JwtService::new(config),
            Err(TokenError::Configuration(_))
        ));
    }
}
