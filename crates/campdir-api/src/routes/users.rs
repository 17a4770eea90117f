//! 사용자 관리 endpoints (admin 전용).
//!
//! 목록 조회는 쿼리 변환기를 거치며, 응답 문서는
//! 비밀번호/재설정 토큰 필드를 절대 포함하지 않습니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{hash_password, require_role, AuthUser, Role};
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_document_write;
use crate::query::{run_list_query, Collection, QueryDescriptor};
use crate::repository::{NewUser, UpdateUser, UserRecord, UserRepository};
use crate::state::AppState;

/// 사용자 생성 요청 (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자여야 합니다"))]
    pub name: String,
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
    #[validate(length(min = 6, message = "비밀번호는 최소 6자여야 합니다"))]
    pub password: String,
    /// user | publisher | admin (기본 user)
    pub role: Option<String>,
}

/// 사용자 수정 요청 (admin). None인 필드는 유지됩니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자여야 합니다"))]
    pub name: Option<String>,
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "비밀번호는 최소 6자여야 합니다"))]
    pub password: Option<String>,
    pub role: Option<String>,
}

fn validation_error(err: validator::ValidationErrors) -> ApiError {
    ApiError::Validation(err.to_string())
}

fn parse_role(s: &str) -> Result<Role, ApiError> {
    Role::parse(s).ok_or_else(|| ApiError::Validation(format!("알 수 없는 역할입니다: {}", s)))
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("사용자를 찾을 수 없습니다: {}", id))
}

/// 사용자 목록 조회. 필터/정렬/페이지네이션/필드선택 지원.
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    require_role(&admin, &[Role::Admin])?;

    let desc = QueryDescriptor::from_params(&params)?;
    let result = run_list_query(state.pool()?, Collection::Users, &desc, None).await?;

    Ok(Json(Envelope::list(
        result.rows.len(),
        result.pagination,
        result.rows,
    )))
}

/// 사용자 단건 조회.
///
/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<UserRecord>>> {
    require_role(&admin, &[Role::Admin])?;

    let user = UserRepository::find_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Envelope::ok(user)))
}

/// 사용자 생성. admin은 어떤 역할로도 생성할 수 있습니다.
///
/// POST /api/v1/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<UserRecord>>)> {
    require_role(&admin, &[Role::Admin])?;
    payload.validate().map_err(validation_error)?;

    let role = match payload.role.as_deref() {
        Some(s) => parse_role(s)?,
        None => Role::User,
    };
    let password_hash = hash_password(
        &payload.password,
        state.config.auth.argon2_m_cost,
        state.config.auth.argon2_t_cost,
    )?;

    let user = UserRepository::create(
        state.pool()?,
        NewUser {
            name: payload.name,
            email: payload.email,
            role,
            password_hash,
        },
    )
    .await?;
    record_document_write("users", "create");

    Ok((StatusCode::CREATED, Json(Envelope::ok(user))))
}

/// 사용자 수정.
///
/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<UserRecord>>> {
    require_role(&admin, &[Role::Admin])?;
    payload.validate().map_err(validation_error)?;

    let role = payload.role.as_deref().map(parse_role).transpose()?;
    let password_hash = payload
        .password
        .as_deref()
        .map(|p| {
            hash_password(
                p,
                state.config.auth.argon2_m_cost,
                state.config.auth.argon2_t_cost,
            )
        })
        .transpose()?;

    let user = UserRepository::update(
        state.pool()?,
        id,
        UpdateUser {
            name: payload.name,
            email: payload.email,
            role,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;
    record_document_write("users", "update");

    Ok(Json(Envelope::ok(user)))
}

/// 사용자 삭제.
///
/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&admin, &[Role::Admin])?;

    let deleted = UserRepository::delete(state.pool()?, id).await?;
    if !deleted {
        return Err(not_found(id));
    }
    record_document_write("users", "delete");

    Ok(Json(Envelope::ok(serde_json::json!({}))))
}

/// 사용자 관리 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
