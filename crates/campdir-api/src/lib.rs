//! 부트캠프 디렉토리 REST API.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (부트캠프/코스/리뷰/사용자)
//! - JWT 인증 및 역할 기반 인가
//! - 목록 질의 변환기 (필터/정렬/페이지네이션/필드선택)
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 관리
//! - [`query`]: 목록 질의 디스크립터와 SQL 실행 계획
//! - [`repository`]: 데이터베이스 접근 계층
//! - [`services`]: 지오코딩/메일/파일 저장 collaborator
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod query;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{can_mutate, hash_password, require_role, verify_password, AuthUser, Claims, Role};
pub use envelope::{Envelope, Pagination};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use query::{run_list_query, Collection, QueryDescriptor};
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
