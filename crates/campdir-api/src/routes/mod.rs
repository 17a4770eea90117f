//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 회원가입/로그인/비밀번호 재설정
//! - `/api/v1/bootcamps` - 부트캠프 CRUD, 반경 검색, 사진 업로드
//!   (코스/리뷰 중첩 라우트 포함)
//! - `/api/v1/courses` - 코스 목록/단건/수정/삭제
//! - `/api/v1/reviews` - 리뷰 목록/단건/수정/삭제
//! - `/api/v1/users` - 사용자 관리 (admin 전용)

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod health;
pub mod reviews;
pub mod users;

pub use auth::{auth_router, LoginRequest, RegisterRequest, TokenResponse};
pub use bootcamps::bootcamps_router;
pub use courses::courses_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use reviews::reviews_router;
pub use users::users_router;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/bootcamps", bootcamps_router())
        .nest("/api/v1/courses", courses_router())
        .nest("/api/v1/reviews", reviews_router())
        .nest("/api/v1/users", users_router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        create_api_router().with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_health_wired() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for uri in [
            "/api/v1/auth/me",
            "/api/v1/users",
        ] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "route {} should require auth",
                uri
            );
        }
    }
}
