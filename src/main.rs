mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::extractor::ForwardedForPolicy;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::attachments::{routes as attachments_routes, AttachmentService};
use crate::features::auth::rate_limiter::InMemoryAttemptLimiter;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::{AuthService, TokenService};
use crate::features::company_settings::{routes as company_settings_routes, CompanySettingsService};
use crate::features::export::routes as export_routes;
use crate::features::notes::{routes as notes_routes, NoteService};
use crate::features::notifications::NotificationDispatcher;
use crate::features::requests::{routes as requests_routes, RequestService};
use crate::features::scoring::services::{ChatCompletionOracle, ScoringOracle, UnconfiguredOracle};
use crate::features::scoring::{routes as scoring_routes, ScoringService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::mailer::build_mailer;
use crate::modules::storage::LocalFileStorage;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

/// Services behind the HTTP routers
struct AppServices {
    tokens: Arc<TokenService>,
    auth: Arc<AuthService>,
    users: Arc<UserService>,
    requests: Arc<RequestService>,
    notes: Arc<NoteService>,
    attachments: Arc<AttachmentService>,
    company_settings: Arc<CompanySettingsService>,
    scoring: Arc<ScoringService>,
}

async fn build_services(pool: PgPool, config: &Config) -> anyhow::Result<AppServices> {
    let users = Arc::new(UserService::new(pool.clone()));
    let tokens = Arc::new(TokenService::new(config.session.clone()));
    let password_change_limiter = Arc::new(InMemoryAttemptLimiter::from_config(&config.rate_limit));
    let auth = Arc::new(AuthService::new(
        Arc::clone(&users),
        Arc::clone(&tokens),
        password_change_limiter,
    ));
    tracing::info!("Auth services initialized");

    let mailer = build_mailer(&config.mail)?;
    let notifier = Arc::new(NotificationDispatcher::new(
        Arc::clone(&users),
        mailer,
        config.mail.app_public_url.clone(),
    ));

    let company_settings = Arc::new(CompanySettingsService::new(pool.clone()));

    let oracle: Arc<dyn ScoringOracle> = match config.scoring.api_url.as_deref() {
        Some(api_url) => {
            tracing::info!("Scoring oracle: {} ({})", api_url, config.scoring.model);
            Arc::new(ChatCompletionOracle::new(api_url, &config.scoring)?)
        }
        None => {
            tracing::warn!("SCORING_API_URL not set; new requests get the fallback score");
            Arc::new(UnconfiguredOracle)
        }
    };
    let scoring = Arc::new(ScoringService::new(
        pool.clone(),
        oracle,
        Arc::clone(&company_settings),
    ));

    let requests = Arc::new(RequestService::new(
        pool.clone(),
        Arc::clone(&notifier),
        Arc::clone(&scoring),
    ));
    let notes = Arc::new(NoteService::new(
        pool.clone(),
        Arc::clone(&requests),
        Arc::clone(&notifier),
    ));

    let storage = Arc::new(LocalFileStorage::new(&config.storage).await?);
    tracing::info!(
        "Attachment storage at {}",
        config.storage.uploads_dir.display()
    );
    let attachments = Arc::new(AttachmentService::new(
        pool,
        Arc::clone(&requests),
        storage,
        config.storage.max_attachment_size,
    ));

    Ok(AppServices {
        tokens,
        auth,
        users,
        requests,
        notes,
        attachments,
        company_settings,
        scoring,
    })
}

/// API routes without swagger or the outer tower layers
fn api_router(services: &AppServices, config: &Config) -> Router {
    // Protected routes (require a session)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(
            Arc::clone(&services.auth),
            Arc::clone(&services.users),
        ))
        .merge(users_routes::routes(Arc::clone(&services.users)))
        .merge(requests_routes::routes(Arc::clone(&services.requests)))
        .merge(notes_routes::routes(Arc::clone(&services.notes)))
        .merge(attachments_routes::routes(
            Arc::clone(&services.attachments),
            config.storage.max_attachment_size,
        ))
        .merge(company_settings_routes::routes(Arc::clone(
            &services.company_settings,
        )))
        .merge(scoring_routes::routes(Arc::clone(&services.scoring)))
        .merge(export_routes::routes(Arc::clone(&services.requests)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(protected_routes)
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(axum::Extension(ForwardedForPolicy {
            trusted: config.app.trust_forwarded_for,
        }))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let services = build_services(pool, &config).await?;

    if let Some((email, password)) = config.bootstrap.admin_credentials() {
        if services.users.ensure_bootstrap_admin(email, password).await? {
            tracing::info!("Bootstrap admin {} created", email);
        }
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let app = Router::new()
        .merge(swagger)
        .merge(api_router(&services, &config))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    // Connect info feeds the client origin used by the password-change limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{
        AppConfig, BootstrapConfig, DatabaseConfig, MailConfig, RateLimitConfig, ScoringConfig,
        SessionConfig, StorageConfig, SwaggerConfig,
    };
    use crate::features::users::models::{Role, User};
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn config(uploads_dir: &std::path::Path) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origins: vec!["*".to_string()],
                max_request_body_size: 10 * 1024 * 1024,
                trust_forwarded_for: false,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:1/unused".to_string(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout_secs: 1,
                idle_timeout_secs: 1,
                max_lifetime_secs: 1,
            },
            session: SessionConfig {
                jwt_secret: "router-test-secret-router-test-secret".to_string(),
                issuer: "purchase-desk".to_string(),
                ttl: Duration::from_secs(3600),
                cookie_name: "access_token".to_string(),
                cookie_secure: false,
            },
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig {
                uploads_dir: uploads_dir.to_path_buf(),
                max_attachment_size: 5 * 1024 * 1024,
            },
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from: "Purchase Desk <no-reply@localhost>".to_string(),
                app_public_url: "http://localhost:3000".to_string(),
            },
            scoring: ScoringConfig {
                api_url: None,
                api_key: None,
                model: "test-model".to_string(),
                timeout: Duration::from_secs(1),
            },
            bootstrap: BootstrapConfig::default(),
            swagger: SwaggerConfig {
                username: None,
                password: None,
                title: "Purchase Desk API".to_string(),
                version: "0.1.0".to_string(),
                description: "test".to_string(),
            },
        }
    }

    async fn server() -> (TestServer, Arc<TokenService>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pool = database::create_lazy_pool(&config.database.url);

        let services = build_services(pool, &config).await.unwrap();
        let tokens = Arc::clone(&services.tokens);
        let server = TestServer::new(api_router(&services, &config)).unwrap();

        (server, tokens, dir)
    }

    fn session_for(tokens: &TokenService, role: Role) -> String {
        let user = User {
            id: Uuid::now_v7(),
            email: "router@example.com".to_string(),
            full_name: "Router Test".to_string(),
            password_hash: String::new(),
            role,
            manager_limit: None,
            supervisor_id: None,
            is_deleted: false,
            created_at: Utc::now(),
        };
        tokens.issue(&user).unwrap().token
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (server, _, _dir) = server().await;
        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_session() {
        let (server, _, _dir) = server().await;

        server.get("/api/Requests").await.assert_status_unauthorized();
        server.get("/auth/me").await.assert_status_unauthorized();
        server.get("/api/export").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let (server, _, _dir) = server().await;

        server
            .get("/api/Requests")
            .authorization_bearer("not-a-token")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_without_session() {
        let (server, _, _dir) = server().await;

        let response = server.post("/auth/logout").await;
        response.assert_status_ok();

        let cookie = response.header(header::SET_COOKIE);
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_admin_routes_reject_other_roles() {
        let (server, tokens, _dir) = server().await;
        let token = session_for(&tokens, Role::Employee);

        server
            .post("/api/AI/generate-missing-scores")
            .authorization_bearer(&token)
            .await
            .assert_status_forbidden();
        server
            .get("/api/Users")
            .authorization_bearer(&token)
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_only_approvers_change_status() {
        let (server, tokens, _dir) = server().await;
        let token = session_for(&tokens, Role::Employee);

        server
            .patch(&format!("/api/Requests/{}/status", Uuid::now_v7()))
            .authorization_bearer(&token)
            .json(&serde_json::json!({ "status": "approved" }))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_password_limit() {
        let (server, tokens, _dir) = server().await;
        let token = session_for(&tokens, Role::Employee);
        let body = serde_json::json!({
            "current_password": "Current#Pass1",
            "new_password": "Another#Pass2",
            "confirm_password": "Another#Pass2",
        });

        // The first five attempts pass the limiter and then fail on the unreachable database
        for i in 0..5 {
            let response = server
                .patch("/auth/change-password")
                .authorization_bearer(&token)
                .add_header("x-forwarded-for", format!("203.0.113.{}", i))
                .json(&body)
                .await;
            assert_ne!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        }

        server
            .patch("/auth/change-password")
            .authorization_bearer(&token)
            .add_header("x-forwarded-for", "203.0.113.99")
            .json(&body)
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
