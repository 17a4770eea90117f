//! 부트캠프 디렉토리 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 부트캠프/코스/리뷰/사용자 CRUD, 인증, 헬스 체크 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use campdir_api::metrics::setup_metrics_recorder;
use campdir_api::middleware::{metrics_layer, rate_limit_middleware, RateLimitConfig, RateLimiter};
use campdir_api::openapi::swagger_ui_router;
use campdir_api::routes::create_api_router;
use campdir_api::services::HttpGeocoder;
use campdir_api::state::AppState;
use campdir_core::{init_logging, AppConfig, LogConfig, LogFormat};

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> anyhow::Result<()> {
    use campdir_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec)?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

/// AppState 초기화.
///
/// DATABASE_URL이 설정되어 있으면 연결 풀을 만들고 마이그레이션을 실행합니다.
async fn create_app_state(config: AppConfig) -> AppState {
    let mut state = AppState::new(config);

    // DB 연결 설정 (DATABASE_URL 환경변수에서)
    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        match PgPoolOptions::new()
            .max_connections(state.config.database.max_connections)
            .acquire_timeout(Duration::from_secs(
                state.config.database.connection_timeout_secs,
            ))
            .connect(&database_url)
            .await
        {
            Ok(pool) => match sqlx::migrate!("./migrations").run(&pool).await {
                Ok(()) => {
                    info!("데이터베이스 연결 및 마이그레이션 완료");
                    state = state.with_db_pool(pool);
                }
                Err(e) => {
                    error!(error = %e, "마이그레이션 실패");
                }
            },
            Err(e) => {
                error!(error = %e, "데이터베이스 연결 실패");
            }
        }
    } else {
        warn!("DATABASE_URL not set, database features will be disabled");
    }

    // 지오코더 설정 (base_url이 비어 있으면 비활성화)
    match HttpGeocoder::from_config(&state.config.geocoder) {
        Some(geocoder) => {
            info!(base_url = %state.config.geocoder.base_url, "지오코더 활성화됨");
            state = state.with_geocoder(Arc::new(geocoder));
        }
        None => {
            warn!("지오코더 미설정, 반경 검색과 주소 변환이 비활성화됩니다");
        }
    }

    state
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    rate_limiter: Option<RateLimiter>,
) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // API 라우터 (Rate Limit 조건부 적용)
    let api_router = match rate_limiter {
        Some(limiter) => create_api_router()
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            )),
        None => {
            info!("Rate limiting DISABLED (rate_limit_per_minute = 0)");
            create_api_router().with_state(state)
        }
    };

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // 설정 로드 (config/default.toml + CAMPDIR__* 환경변수)
    let config = AppConfig::load_default()
        .map_err(|e| anyhow::anyhow!("설정 로드 실패: {}", e))?;

    // tracing 초기화
    let log_format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();
    init_logging(LogConfig::new(config.logging.level.clone()).with_format(log_format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting CampDir API server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("소켓 주소가 유효하지 않습니다: {}", e))?;

    if config.auth.jwt_secret == "dev-secret-key-change-in-production" {
        warn!("JWT secret is the default value (INSECURE for development only)");
    }

    // Rate Limiter 구성 (0이면 비활성화)
    let rate_limiter = match config.server.rate_limit_per_minute {
        0 => None,
        rpm => {
            info!(requests_per_minute = rpm, "Rate limiting configured");
            Some(RateLimiter::new(RateLimitConfig::new(rpm)))
        }
    };

    // 오래된 rate limit 버킷 주기 정리
    if let Some(limiter) = rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // AppState 생성 (DB 연결/마이그레이션, 지오코더 초기화 포함)
    let state = Arc::new(create_app_state(config).await);

    info!(version = %state.version, "Application state initialized");
    info!(
        has_db = state.db_pool.is_some(),
        has_geocoder = state.geocoder.is_some(),
        "Service connections status"
    );

    let app = create_router(state, metrics_handle, rate_limiter);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료를 시작합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
