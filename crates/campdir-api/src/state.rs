//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use campdir_core::AppConfig;

use crate::error::ApiError;
use crate::services::{Geocoder, LogMailer, Mailer};

/// 애플리케이션 공유 상태.
///
/// 설정은 프로세스 시작 시 한 번 로드된 불변 구조체이며,
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 애플리케이션 설정 (불변)
    pub config: Arc<AppConfig>,

    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: Option<sqlx::PgPool>,

    /// 메일 발송기 - 비밀번호 재설정 메일
    pub mailer: Arc<dyn Mailer>,

    /// 지오코더 - 주소/우편번호 → 좌표 (미설정 시 반경 검색 비활성화)
    pub geocoder: Option<Arc<dyn Geocoder>>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            db_pool: None,
            mailer: Arc::new(LogMailer),
            geocoder: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 메일 발송기 교체.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// 지오코더 설정.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// DB 풀 참조 반환. 미설정이면 `Upstream` 에러.
    pub fn pool(&self) -> Result<&sqlx::PgPool, ApiError> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| ApiError::Upstream("데이터베이스를 사용할 수 없습니다".to_string()))
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// DB 연결 없이 기본 설정과 로그 메일러를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::new(AppConfig::default())
}
