//! murimi-api - HTTP API server for the murimi member registry

mod handlers;
mod middleware;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use murimi_analytics::WeekScheme;
use murimi_db::{Database, FilesystemBackend, StorageBackend};

use handlers::{
    analytics::{dashboard, farm_types, top_clusters, trends},
    cluster_leaders::{
        create_cluster_leader, delete_cluster_leader, get_cluster_leader, list_cluster_leaders,
        update_cluster_leader,
    },
    events::{create_event, delete_event, get_event, list_events, update_event},
    export::export_members,
    members::{create_member, delete_member, get_member, list_members, update_member},
    soil_samples::{
        create_soil_sample, delete_soil_sample, list_soil_samples, upload_soil_report,
    },
};
use middleware::auth::{require_admin, require_staff};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically and line up
/// with log timestamps when correlating requests.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing; this service
/// sits behind one organization's gateway).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// File storage for uploaded soil lab reports.
    storage: Arc<dyn StorageBackend>,
    /// Week-bucketing scheme used by the trends endpoint when the request
    /// does not pick one.
    week_scheme: WeekScheme,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// OpenAPI documentation served to Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Murimi Member Registry API",
        version = "2026.8.1",
        description = "Member, cluster leader, event, and soil sample management with an analytics dashboard"
    ),
    tags(
        (name = "Members", description = "Member registration CRUD and CSV export"),
        (name = "Cluster Leaders", description = "Cluster leader management"),
        (name = "Events", description = "Calendar events"),
        (name = "Soil Samples", description = "Soil samples and lab report uploads"),
        (name = "Analytics", description = "Dashboard metrics, trends, rollups, and distributions"),
        (name = "System", description = "Health checks")
    ),
    components(schemas(
        murimi_core::Member,
        murimi_core::CreateMemberRequest,
        murimi_core::UpdateMemberRequest,
        murimi_core::ContractStatus,
        murimi_core::ClusterLeader,
        murimi_core::CreateClusterLeaderRequest,
        murimi_core::UpdateClusterLeaderRequest,
        murimi_core::ContactPerson,
        murimi_core::LeaderStatus,
        murimi_core::Event,
        murimi_core::CreateEventRequest,
        murimi_core::UpdateEventRequest,
        murimi_core::EventType,
        murimi_core::EventAudience,
        murimi_core::EventStatus,
        murimi_core::SoilSample,
        murimi_core::CreateSoilSampleRequest,
        murimi_core::HealthRating,
        murimi_analytics::MemberMetrics,
        murimi_analytics::ClusterRollup,
        murimi_analytics::FarmTypeShare,
        murimi_analytics::WeekBucket,
        murimi_analytics::WeekScheme,
        handlers::analytics::DashboardResponse,
        handlers::analytics::TrendsResponse,
    ))
)]
struct ApiDoc;

// =============================================================================
// CORS
// =============================================================================

/// Parse a comma-separated origin list, dropping entries that are not valid
/// header values.
fn parse_origin_list(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

/// Allowed CORS origins from `ALLOWED_ORIGINS` (comma-separated), defaulting
/// to the local dashboard dev server.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let origins = parse_origin_list(&origins_str);
    if origins.is_empty() {
        return vec![HeaderValue::from_static("http://localhost:3000")];
    }
    origins
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "murimi_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "murimi_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("murimi-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/murimi".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60 = 1 minute)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Initialize file storage for soil lab reports
    let file_storage_path =
        std::env::var("FILE_STORAGE_PATH").unwrap_or_else(|_| "/var/lib/murimi/files".to_string());
    let public_file_base_url = std::env::var("PUBLIC_FILE_BASE_URL")
        .unwrap_or_else(|_| format!("http://{}:{}/files", host, port));
    let storage = FilesystemBackend::new(&file_storage_path, &public_file_base_url);
    if let Err(e) = storage.validate().await {
        anyhow::bail!("File storage validation failed at {}: {}", file_storage_path, e);
    }
    info!(path = %file_storage_path, "File storage ready");

    // Week-bucketing scheme for the trends endpoint
    let week_scheme = match std::env::var("WEEK_SCHEME") {
        Ok(raw) => WeekScheme::parse(&raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid WEEK_SCHEME '{}' (expected 'fixed' or 'iso')", raw))?,
        Err(_) => WeekScheme::default(),
    };
    info!(?week_scheme, "Trend week scheme configured");

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let period = std::time::Duration::from_secs(rate_limit_period_secs.max(1));
        let quota = Quota::with_period(period)
            .ok_or_else(|| anyhow::anyhow!("Rate limit period must be non-zero"))?
            .allow_burst(
                NonZeroU32::new(rate_limit_requests.clamp(1, u32::MAX as u64) as u32)
                    .ok_or_else(|| anyhow::anyhow!("Rate limit must be non-zero"))?,
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let state = AppState {
        db,
        storage: Arc::new(storage),
        week_scheme,
        rate_limiter,
    };

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the full application router.
///
/// Reads are open; mutating routes require a staff role; deletes and the
/// member export require admin.
fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, patch, post};

    let open_routes = Router::new()
        .route("/api/v1/members", get(list_members))
        .route("/api/v1/members/:id", get(get_member))
        .route("/api/v1/members/:id/soil-samples", get(list_soil_samples))
        .route("/api/v1/cluster-leaders", get(list_cluster_leaders))
        .route("/api/v1/cluster-leaders/:id", get(get_cluster_leader))
        .route("/api/v1/events", get(list_events))
        .route("/api/v1/events/:id", get(get_event))
        .route("/api/v1/analytics/dashboard", get(dashboard))
        .route("/api/v1/analytics/trends", get(trends))
        .route("/api/v1/analytics/clusters/top", get(top_clusters))
        .route("/api/v1/analytics/farm-types", get(farm_types));

    let staff_routes = Router::new()
        .route("/api/v1/members", post(create_member))
        .route("/api/v1/members/:id", patch(update_member))
        .route("/api/v1/members/:id/soil-samples", post(create_soil_sample))
        .route("/api/v1/cluster-leaders", post(create_cluster_leader))
        .route("/api/v1/cluster-leaders/:id", patch(update_cluster_leader))
        .route("/api/v1/events", post(create_event))
        .route("/api/v1/events/:id", patch(update_event))
        .route("/api/v1/soil-samples/:id/report", post(upload_soil_report))
        .route_layer(axum::middleware::from_fn(require_staff));

    let admin_routes = Router::new()
        .route("/api/v1/members/:id", delete(delete_member))
        .route("/api/v1/members/export", get(export_members))
        .route("/api/v1/cluster-leaders/:id", delete(delete_cluster_leader))
        .route("/api/v1/events/:id", delete(delete_event))
        .route("/api/v1/soil-samples/:id", delete(delete_soil_sample))
        .route_layer(axum::middleware::from_fn(require_admin));

    Router::new()
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(open_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // Lab report scans are the largest uploads this service accepts
        .layer(RequestBodyLimitLayer::new(25 * 1024 * 1024)) // 25 MB
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .with_state(state)
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(murimi_core::Error),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<murimi_core::Error> for ApiError {
    fn from(err: murimi_core::Error) -> Self {
        match &err {
            murimi_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            murimi_core::Error::MemberNotFound(_)
            | murimi_core::Error::ClusterLeaderNotFound(_) => ApiError::NotFound(err.to_string()),
            murimi_core::Error::DuplicateClusterName(_) => ApiError::Conflict(err.to_string()),
            murimi_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_duplicate_cluster_name_maps_to_conflict() {
        let err = murimi_core::Error::DuplicateClusterName("Mhondoro North".to_string());
        let api_err = ApiError::from(err);
        match api_err {
            ApiError::Conflict(msg) => assert!(msg.contains("Mhondoro North")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_mappings() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(murimi_core::Error::MemberNotFound(id)),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(murimi_core::Error::ClusterLeaderNotFound(id)),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err = murimi_core::Error::InvalidInput("Unknown export field: 'surname'".to_string());
        assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));
    }

    #[test]
    fn test_parse_origin_list() {
        let origins = parse_origin_list("https://murimi.example.org, http://localhost:3000");
        assert_eq!(origins.len(), 2);

        let origins = parse_origin_list("  , ,");
        assert!(origins.is_empty());
    }

    #[test]
    fn test_error_status_codes() {
        let resp = ApiError::NotFound("missing".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::Conflict("taken".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ApiError::BadRequest("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Forbidden("staff only".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
