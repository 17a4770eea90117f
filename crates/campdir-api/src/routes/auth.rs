//! 인증 endpoints.
//!
//! 회원가입, 로그인, 비밀번호 재설정 흐름을 처리합니다.
//! 로그인 성공 시 토큰을 JSON 본문과 httpOnly 쿠키 양쪽으로 내려줍니다.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{
    create_token, generate_reset_token, hash_password, hash_reset_token, verify_password, AuthUser,
    Claims, Role,
};
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_auth_event;
use crate::repository::{NewUser, UserRecord, UserRepository};
use crate::services::Mail;
use crate::state::AppState;

/// 회원가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 사용자 이름
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자여야 합니다"))]
    pub name: String,
    /// 이메일 주소
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
    /// 비밀번호 (최소 6자)
    #[validate(length(min = 6, message = "비밀번호는 최소 6자여야 합니다"))]
    pub password: String,
    /// 역할 (user | publisher, 기본 user)
    pub role: Option<String>,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 본인 정보 수정 요청. None인 필드는 유지됩니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDetailsRequest {
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자여야 합니다"))]
    pub name: Option<String>,
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: Option<String>,
}

/// 비밀번호 변경 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// 현재 비밀번호
    pub current_password: String,
    /// 새 비밀번호 (최소 6자)
    #[validate(length(min = 6, message = "비밀번호는 최소 6자여야 합니다"))]
    pub new_password: String,
}

/// 비밀번호 재설정 메일 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

/// 재설정 토큰으로 비밀번호 교체 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "비밀번호는 최소 6자여야 합니다"))]
    pub password: String,
}

/// 토큰 발급 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

fn validation_error(err: validator::ValidationErrors) -> ApiError {
    ApiError::Validation(err.to_string())
}

/// 토큰을 JSON 본문과 httpOnly 쿠키로 함께 반환.
fn token_response(state: &AppState, user: &UserRecord) -> ApiResult<Response> {
    let claims = Claims::new(
        user.id.to_string(),
        user.role,
        state.config.auth.token_ttl_minutes,
    );
    let token = create_token(&claims, &state.config.auth.jwt_secret)?;

    let max_age = state.config.auth.cookie_expire_days * 86400;
    let cookie = format!("token={token}; Max-Age={max_age}; Path=/; HttpOnly");
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::Upstream("쿠키 생성 실패".to_string()))?;

    let mut response = Json(TokenResponse {
        success: true,
        token,
    })
    .into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// 회원가입.
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "가입 성공, 토큰 발급", body = TokenResponse),
        (status = 400, description = "잘못된 입력 또는 중복 이메일", body = crate::error::ErrorBody)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(validation_error)?;

    // admin 역할로는 가입할 수 없음 (관리자가 /users로 승격)
    let role = match payload.role.as_deref() {
        None => Role::User,
        Some(s) => match Role::parse(s) {
            Some(Role::Admin) | None => {
                return Err(ApiError::Validation(format!(
                    "허용되지 않는 역할입니다: {}",
                    s
                )))
            }
            Some(role) => role,
        },
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

    record_auth_event("register", "success");
    tracing::info!(user_id = %user.id, "새 사용자 가입");

    token_response(&state, &user)
}

/// 로그인.
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공, 토큰 발급", body = TokenResponse),
        (status = 401, description = "잘못된 자격 증명", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(validation_error)?;

    let user = UserRepository::find_by_email(state.pool()?, &payload.email)
        .await?
        .ok_or_else(|| {
            record_auth_event("login", "failure");
            ApiError::Unauthenticated("잘못된 자격 증명입니다".to_string())
        })?;

    // VerificationFailed는 401로 매핑됨
    if let Err(err) = verify_password(&payload.password, &user.password_hash) {
        record_auth_event("login", "failure");
        return Err(err.into());
    }

    record_auth_event("login", "success");
    token_response(&state, &user)
}

/// 로그아웃. 토큰 쿠키를 짧은 만료의 더미 값으로 덮어씁니다.
///
/// GET /api/v1/auth/logout
pub async fn logout() -> ApiResult<Response> {
    record_auth_event("logout", "success");

    let mut response =
        Json(Envelope::ok(serde_json::json!({}))).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_static("token=none; Max-Age=10; Path=/; HttpOnly"),
    );
    Ok(response)
}

/// 현재 사용자 조회.
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "현재 사용자 정보"),
        (status = 401, description = "인증 실패", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<Envelope<UserRecord>> {
    Json(Envelope::ok(user))
}

/// 본인 이름/이메일 수정.
///
/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateDetailsRequest>,
) -> ApiResult<Json<Envelope<UserRecord>>> {
    payload.validate().map_err(validation_error)?;

    let updated = UserRepository::update_details(
        state.pool()?,
        user.id,
        payload.name.as_deref(),
        payload.email.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(Json(Envelope::ok(updated)))
}

/// 비밀번호 변경. 현재 비밀번호 불일치는 401.
///
/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(validation_error)?;

    verify_password(&payload.current_password, &user.password_hash)?;

    let new_hash = hash_password(
        &payload.new_password,
        state.config.auth.argon2_m_cost,
        state.config.auth.argon2_t_cost,
    )?;
    UserRepository::update_password_hash(state.pool()?, user.id, &new_hash).await?;

    token_response(&state, &user)
}

/// 비밀번호 재설정 메일 발송.
///
/// 발송 실패 시 저장된 재설정 토큰 필드를 제거하고 500을 반환합니다
/// (부분 성공 상태를 남기지 않음).
///
/// POST /api/v1/auth/forgotpassword
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Envelope<String>>> {
    payload.validate().map_err(validation_error)?;

    let user = UserRepository::find_by_email(state.pool()?, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("해당 이메일의 사용자가 없습니다".to_string()))?;

    let (raw_token, token_hash) = generate_reset_token();
    let expire = Utc::now() + Duration::minutes(state.config.auth.reset_token_ttl_minutes);
    UserRepository::set_reset_token(state.pool()?, user.id, &token_hash, expire).await?;

    let mail = Mail {
        to: user.email.clone(),
        subject: "비밀번호 재설정 안내".to_string(),
        body: format!(
            "다음 주소로 PUT 요청을 보내 비밀번호를 재설정하세요: \
             /api/v1/auth/resetpassword/{raw_token}"
        ),
    };

    if let Err(err) = state.mailer.send(mail).await {
        tracing::error!(user_id = %user.id, error = %err, "재설정 메일 발송 실패");
        // 발송 실패 시 토큰 롤백
        UserRepository::clear_reset_token(state.pool()?, user.id).await?;
        return Err(ApiError::Upstream("이메일을 보낼 수 없습니다".to_string()));
    }

    Ok(Json(Envelope::ok("이메일이 발송되었습니다".to_string())))
}

/// 재설정 토큰으로 비밀번호 교체.
///
/// PUT /api/v1/auth/resetpassword/{token}
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(validation_error)?;

    // 후보를 저장 형식으로 해싱해 만료되지 않은 일치 항목 조회
    let token_hash = hash_reset_token(&token);
    let user = UserRepository::find_by_reset_token(state.pool()?, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Validation("유효하지 않은 토큰입니다".to_string()))?;

    let new_hash = hash_password(
        &payload.password,
        state.config.auth.argon2_m_cost,
        state.config.auth.argon2_t_cost,
    )?;
    UserRepository::update_password_hash(state.pool()?, user.id, &new_hash).await?;
    UserRepository::clear_reset_token(state.pool()?, user.id).await?;

    record_auth_event("reset_password", "success");
    token_response(&state, &user)
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(me))
        .route("/updatedetails", put(update_details))
        .route("/updatepassword", put(update_password))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/{token}", put(reset_password))
}
