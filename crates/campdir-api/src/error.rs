//! 통합 API 에러 타입.
//!
//! 모든 핸들러의 실패는 이 타입 하나로 수렴하고,
//! 중앙 `IntoResponse` 구현이 상태 코드와
//! `{"success": false, "error": "..."}` 본문으로 변환합니다.
//! 스택 트레이스나 내부 상세는 외부로 노출하지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{JwtError, PasswordError};

/// API 에러 분류.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 잘못된 입력 (400)
    #[error("{0}")]
    Validation(String),

    /// 인증 실패 - 자격 증명 누락/무효/만료 (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// 권한 부족 - 역할 또는 소유권 불충족 (403)
    #[error("{0}")]
    Forbidden(String),

    /// 리소스 없음 (404)
    #[error("{0}")]
    NotFound(String),

    /// 데이터스토어/메일/지오코딩/파일 저장 실패 (500)
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    /// 매핑되는 HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 에러 응답 본문.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// 항상 false
    pub success: bool,
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "내부 에러 발생");
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("리소스를 찾을 수 없습니다".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // invalid_text_representation: 필터 값이 숫자로 캐스팅되지 않음
                Some("22P02") => {
                    ApiError::Validation("잘못된 필터 값 형식입니다".to_string())
                }
                // unique_violation
                Some("23505") => {
                    ApiError::Validation("중복된 값이 입력되었습니다".to_string())
                }
                _ => ApiError::Upstream(format!("데이터베이스 에러: {}", err)),
            },
            _ => ApiError::Upstream(format!("데이터베이스 에러: {}", err)),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(_: JwtError) -> Self {
        ApiError::Unauthenticated("이 리소스에 접근할 권한이 없습니다".to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::VerificationFailed => {
                ApiError::Unauthenticated("잘못된 자격 증명입니다".to_string())
            }
            _ => ApiError::Upstream("비밀번호 처리 실패".to_string()),
        }
    }
}

impl From<campdir_core::CoreError> for ApiError {
    fn from(err: campdir_core::CoreError) -> Self {
        use campdir_core::CoreError;
        match err {
            CoreError::InvalidInput(msg) => ApiError::Validation(msg),
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("no".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            success: false,
            error: "리소스를 찾을 수 없습니다".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains("error"));
    }

    #[test]
    fn test_jwt_error_maps_to_unauthenticated() {
        let api: ApiError = JwtError::InvalidToken.into();
        assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let api: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
    }
}
