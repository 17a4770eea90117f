//! Axum용 JWT 인증/인가 게이트.
//!
//! Bearer 토큰을 검증하고 사용자 레코드를 요청 컨텍스트에 올리는
//! 추출기와 역할 검사 헬퍼를 제공합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use super::decode_token;
use crate::error::ApiError;
use crate::repository::{UserRecord, UserRepository};
use crate::state::AppState;

/// 인증된 사용자 추출기.
///
/// `Authorization: Bearer <token>` 헤더를 검증하고
/// 토큰의 subject를 전체 사용자 레코드로 해석합니다.
/// 누락, 서명 실패, 만료, 삭제된 사용자 전부 동일한 401을 반환합니다
/// (어떤 실패 모드인지 외부에 노출하지 않음).
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user): AuthUser,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

fn unauthenticated() -> ApiError {
    ApiError::Unauthenticated("이 리소스에 접근할 권한이 없습니다".to_string())
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Authorization 헤더에서 토큰 추출
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(unauthenticated)?;

        // Bearer 토큰 형식 확인
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(unauthenticated)?;

        // 서명 + 만료 검증 (모든 실패는 동일한 401)
        let token_data =
            decode_token(token, &state.config.auth.jwt_secret).map_err(|_| unauthenticated())?;

        let user_id: Uuid = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| unauthenticated())?;

        // 토큰 발급 후 삭제된 사용자는 미인증으로 취급
        let user = UserRepository::find_by_id(state.pool()?, user_id)
            .await?
            .ok_or_else(unauthenticated)?;

        Ok(AuthUser(user))
    }
}

/// 역할 검사.
///
/// 인증은 이미 통과한 상태를 전제로, 허용 역할 집합에 속하는지 확인합니다.
/// 불충족 시 401과 구분되는 403 `Forbidden`을 반환합니다.
pub fn require_role(user: &UserRecord, allowed: &[super::Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "{} 역할은 이 작업을 수행할 수 없습니다",
            user.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Utc;

    fn user_with_role(role: Role) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: "테스트".to_string(),
            email: "test@example.com".to_string(),
            role,
            password_hash: String::new(),
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_role_allowed() {
        let publisher = user_with_role(Role::Publisher);
        assert!(require_role(&publisher, &[Role::Publisher, Role::Admin]).is_ok());

        let admin = user_with_role(Role::Admin);
        assert!(require_role(&admin, &[Role::Publisher, Role::Admin]).is_ok());
    }

    #[test]
    fn test_require_role_forbidden() {
        let user = user_with_role(Role::User);
        let result = require_role(&user, &[Role::Publisher, Role::Admin]);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_forbidden_distinct_from_unauthenticated() {
        let user = user_with_role(Role::User);
        let err = require_role(&user, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        let unauth = unauthenticated();
        assert_eq!(unauth.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
