//! Bearer token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use fleetdesk_core::config::AuthConfig;
use fleetdesk_core::error::AppError;

use super::claims::Claims;

/// Verifies HS256 tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    ///
    /// `iss` and `aud` are only checked when configured.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        if config.issuer.is_empty() {
            validation.iss = None;
        } else {
            validation.set_issuer(&[config.issuer.as_str()]);
        }
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[config.audience.as_str()]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature, expiry, and the configured issuer/audience.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer
                    | jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        AppError::authentication("Token was not issued for this service")
                    }
                    _ => AppError::authentication("Invalid token"),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::context::UserRole;
    use crate::jwt::JwtEncoder;
    use fleetdesk_core::error::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_round_trip() {
        let business = Uuid::new_v4();
        let encoder = JwtEncoder::new(&config());
        let token = encoder
            .issue(Uuid::new_v4(), UserRole::Vendor, Some(business))
            .unwrap();

        let claims = JwtDecoder::new(&config()).decode(&token).unwrap();
        assert_eq!(claims.role, UserRole::Vendor);
        assert_eq!(claims.business_id, Some(business));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtEncoder::new(&config())
            .issue(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..AuthConfig::default()
        };
        let err = JwtDecoder::new(&other).decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtEncoder::new(&config())
            .with_ttl(chrono::Duration::seconds(-120))
            .issue(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        let err = JwtDecoder::new(&config()).decode(&token).unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_audience_checked_when_configured() {
        let token = JwtEncoder::new(&config())
            .issue(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        let strict = AuthConfig {
            audience: "fleetdesk".into(),
            ..config()
        };
        assert!(JwtDecoder::new(&strict).decode(&token).is_err());

        let token = JwtEncoder::new(&strict)
            .issue(Uuid::new_v4(), UserRole::Admin, None)
            .unwrap();
        assert!(JwtDecoder::new(&strict).decode(&token).is_ok());
    }
}
