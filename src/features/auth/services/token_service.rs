use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, SessionClaims};
use crate::features::users::models::User;

/// Issues and validates signed session tokens and builds the session cookie
pub struct TokenService {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// A freshly issued session token
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

impl TokenService {
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Sign a token carrying the user's id, email and role
    pub fn issue(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let expires_in = self.config.ttl.as_secs() as i64;

        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + expires_in,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))?;

        Ok(IssuedToken { token, expires_in })
    }

    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AppError::Unauthorized("Invalid or expired session".to_string())
        })?;

        Ok(data.claims.into())
    }

    /// Pull the token from the session cookie, falling back to a Bearer header
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let from_cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.config.cookie_name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty());

        from_cookie.or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
    }

    /// HTTP-only cookie usable from a cross-site client
    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue> {
        self.cookie_header(token, self.config.ttl.as_secs())
    }

    pub fn clear_cookie(&self) -> Result<HeaderValue> {
        self.cookie_header("", 0)
    }

    fn cookie_header(&self, value: &str, max_age: u64) -> Result<HeaderValue> {
        // Browsers drop SameSite=None cookies that are not Secure
        let same_site = if self.config.cookie_secure {
            "; Secure; SameSite=None"
        } else {
            "; SameSite=Lax"
        };

        let cookie = format!(
            "{}={}; Path=/; HttpOnly; Max-Age={}{}",
            self.config.cookie_name, value, max_age, same_site
        );

        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use std::time::Duration;
    use uuid::Uuid;

    fn config() -> SessionConfig {
        SessionConfig {
            jwt_secret: "test-secret-test-secret-test-secret!!".to_string(),
            issuer: "purchase-desk".to_string(),
            ttl: Duration::from_secs(3600),
            cookie_name: "access_token".to_string(),
            cookie_secure: true,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::now_v7(),
            email: "ewa@example.com".to_string(),
            full_name: "Ewa Nowak".to_string(),
            password_hash: String::new(),
            role: Role::Manager,
            manager_limit: None,
            supervisor_id: None,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_carries_identity() {
        let service = TokenService::new(config());
        let user = user();

        let issued = service.issue(&user).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let identity = service.validate(&issued.token).unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.email, user.email);
        assert_eq!(identity.role, Role::Manager);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issued = TokenService::new(config()).issue(&user()).unwrap();

        let mut other = config();
        other.jwt_secret = "another-secret-another-secret-another".to_string();
        let result = TokenService::new(other).validate(&issued.token);

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new(config());
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::now_v7(),
            email: "old@example.com".to_string(),
            role: Role::Employee,
            iss: "purchase-desk".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config().jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_token_from_cookie_or_bearer() {
        let service = TokenService::new(config());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi"),
        );
        assert_eq!(
            service.token_from_headers(&headers).as_deref(),
            Some("abc.def.ghi")
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(service.token_from_headers(&headers).as_deref(), Some("xyz"));

        assert!(service.token_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let service = TokenService::new(config());
        let cookie = service.session_cookie("tok").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("access_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=3600"));

        let cleared = service.clear_cookie().unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
