use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub scoring: ScoringConfig,
    pub bootstrap: BootstrapConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Honour `X-Forwarded-For` only when a trusted proxy sets it
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Signed session token settings
#[derive(Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

// Keeps the signing secret out of logs
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_secret", &"***")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Sliding-window limits for password changes
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub password_change_max_attempts: usize,
    pub password_change_window: Duration,
}

/// Local filesystem storage for request attachments
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub uploads_dir: PathBuf,
    pub max_attachment_size: usize,
}

/// Outbound email settings.
/// When `api_url` is absent, notifications are only written to the log.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub app_public_url: String,
}

/// OpenAI-compatible scoring endpoint settings
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// Optional first admin account, seeded when no admin exists yet
#[derive(Clone, Default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            mail: MailConfig::from_env()?,
            scoring: ScoringConfig::from_env()?,
            bootstrap: BootstrapConfig::from_env(),
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

/// Read an optional variable, treating empty strings as unset
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let trust_forwarded_for = env::var("TRUST_FORWARDED_FOR")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| "TRUST_FORWARDED_FOR must be true or false".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            trust_forwarded_for,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SessionConfig {
    const DEFAULT_TTL_SECS: u64 = 3600; // 1 hour
    const MIN_SECRET_LEN: usize = 32;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable is required".to_string())?;

        if jwt_secret.len() < Self::MIN_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET must be at least {} bytes long",
                Self::MIN_SECRET_LEN
            ));
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "purchase-desk".to_string());

        let ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_TTL_SECS must be a valid number".to_string())?;

        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "access_token".to_string());

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "SESSION_COOKIE_SECURE must be true or false".to_string())?;

        Ok(Self {
            jwt_secret,
            issuer,
            ttl: Duration::from_secs(ttl_secs),
            cookie_name,
            cookie_secure,
        })
    }
}

impl RateLimitConfig {
    const DEFAULT_MAX_ATTEMPTS: usize = 5;
    const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

    pub fn from_env() -> Result<Self, String> {
        let password_change_max_attempts = env::var("PASSWORD_CHANGE_MAX_ATTEMPTS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_ATTEMPTS.to_string())
            .parse::<usize>()
            .map_err(|_| "PASSWORD_CHANGE_MAX_ATTEMPTS must be a valid number".to_string())?;

        let window_secs = env::var("PASSWORD_CHANGE_WINDOW_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_WINDOW_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "PASSWORD_CHANGE_WINDOW_SECS must be a valid number".to_string())?;

        Ok(Self {
            password_change_max_attempts,
            password_change_window: Duration::from_secs(window_secs),
        })
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            password_change_max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            password_change_window: Duration::from_secs(Self::DEFAULT_WINDOW_SECS),
        }
    }
}

impl StorageConfig {
    const DEFAULT_MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024; // 5 MiB

    pub fn from_env() -> Result<Self, String> {
        let uploads_dir =
            PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string()));

        let max_attachment_size = env::var("MAX_ATTACHMENT_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_ATTACHMENT_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_ATTACHMENT_SIZE must be a valid number".to_string())?;

        Ok(Self {
            uploads_dir,
            max_attachment_size,
        })
    }
}

impl MailConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_url = optional_var("MAIL_API_URL");
        let api_key = optional_var("MAIL_API_KEY");

        if api_url.is_some() && api_key.is_none() {
            return Err("MAIL_API_KEY is required when MAIL_API_URL is set".to_string());
        }

        let from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "Purchase Desk <no-reply@localhost>".to_string());
        let app_public_url =
            env::var("APP_PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            api_url,
            api_key,
            from,
            app_public_url,
        })
    }
}

impl ScoringConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let api_url = optional_var("SCORING_API_URL");
        let api_key = optional_var("SCORING_API_KEY");
        let model = env::var("SCORING_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_secs = env::var("SCORING_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SCORING_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            api_url,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        Self {
            admin_email: optional_var("BOOTSTRAP_ADMIN_EMAIL"),
            admin_password: optional_var("BOOTSTRAP_ADMIN_PASSWORD"),
        }
    }

    /// Returns (email, password) when both are configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = optional_var("SWAGGER_USERNAME");
        let password = optional_var("SWAGGER_PASSWORD");
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Purchase Desk API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Purchase request approval API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_requires_both_credentials() {
        let partial = BootstrapConfig {
            admin_email: Some("admin@example.com".to_string()),
            admin_password: None,
        };
        assert!(partial.admin_credentials().is_none());

        let full = BootstrapConfig {
            admin_email: Some("admin@example.com".to_string()),
            admin_password: Some("S3cret!x".to_string()),
        };
        assert_eq!(
            full.admin_credentials(),
            Some(("admin@example.com", "S3cret!x"))
        );
    }

    #[test]
    fn test_session_config_debug_hides_secret() {
        let config = SessionConfig {
            jwt_secret: "super-secret-signing-key-that-is-long-enough".to_string(),
            issuer: "purchase-desk".to_string(),
            ttl: Duration::from_secs(3600),
            cookie_name: "access_token".to_string(),
            cookie_secure: true,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
