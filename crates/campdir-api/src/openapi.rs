//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! # 자동 생성 구조
//!
//! 각 라우트 모듈은 자체 스키마를 정의하고, 중앙 `ApiDoc`에서 집계합니다.
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::envelope::Pagination;
use crate::error::ErrorBody;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, LoginRequest, RegisterRequest, TokenResponse,
};

/// CampDir API 문서.
///
/// 주요 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CampDir API",
        version = "0.1.0",
        description = r#"
# CampDir 부트캠프 디렉토리 REST API

부트캠프, 코스, 리뷰, 사용자를 관리하는 REST API입니다.

## 주요 기능

- **부트캠프**: CRUD, 반경 검색, 사진 업로드
- **코스/리뷰**: 부트캠프 중첩 라우트 포함 CRUD
- **사용자 관리**: admin 전용 CRUD
- **목록 질의**: 필터(`field[gt|gte|lt|lte|in]`), 정렬(`sort`),
  페이지네이션(`page`/`limit`), 필드 선택(`select`)

## 인증

보호된 엔드포인트는 JWT Bearer 토큰 인증이 필요합니다.
`Authorization: Bearer <token>` 헤더를 포함하세요.

## 응답 형식

성공은 `{"success": true, "data": ...}`,
실패는 `{"success": false, "error": "..."}` 봉투로 응답합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 회원가입/로그인/비밀번호 재설정"),
        (name = "bootcamps", description = "부트캠프 - CRUD, 반경 검색, 사진 업로드"),
        (name = "courses", description = "코스 - 부트캠프별 코스 관리"),
        (name = "reviews", description = "리뷰 - 부트캠프별 리뷰 관리"),
        (name = "users", description = "사용자 관리 - admin 전용")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ErrorBody,
            Pagination,

            // ===== Auth =====
            RegisterRequest,
            LoginRequest,
            TokenResponse,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Auth =====
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,

        // ===== Bootcamps =====
        crate::routes::bootcamps::list_bootcamps,
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// JWT Bearer 인증 스키마 등록.
///
/// `security(("bearer_auth" = []))`를 참조하는 경로들이 사용합니다.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("CampDir API"));

        // 태그 확인
        assert!(json.contains("health"));
        assert!(json.contains("auth"));
        assert!(json.contains("bootcamps"));

        // 경로 확인
        assert!(json.contains("/health"));
        assert!(json.contains("/health/ready"));
        assert!(json.contains("/api/v1/auth/register"));
        assert!(json.contains("/api/v1/bootcamps"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }

    #[test]
    fn test_openapi_registers_bearer_auth_scheme() {
        let spec = ApiDoc::openapi();
        let schemes = spec
            .components
            .as_ref()
            .map(|c| c.security_schemes.clone())
            .unwrap_or_default();

        assert!(schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("HealthResponse"));
        assert!(json.contains("RegisterRequest"));
        assert!(json.contains("TokenResponse"));
        assert!(json.contains("ErrorBody"));
    }
}
