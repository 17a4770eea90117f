//! 리뷰 endpoints.
//!
//! 코스와 동일한 구조이며 허용 역할만 user|admin으로 다릅니다.
//! 부트캠프당 사용자별 1건 제약 위반(23505)은 400으로 응답합니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{can_mutate, require_role, AuthUser, Role};
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_document_write;
use crate::query::{run_list_query, Collection, Populate, QueryDescriptor};
use crate::repository::{BootcampRepository, ReviewRecord, ReviewRepository};
use crate::state::AppState;

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("리뷰를 찾을 수 없습니다: {}", id))
}

fn bootcamp_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("부트캠프를 찾을 수 없습니다: {}", id))
}

/// 리뷰 전체 목록 조회. 부트캠프 이름/설명 populate.
///
/// GET /api/v1/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    let desc = QueryDescriptor::from_params(&params)?;
    let result = run_list_query(
        state.pool()?,
        Collection::Reviews,
        &desc,
        Some(&Populate::bootcamp()),
    )
    .await?;

    Ok(Json(Envelope::list(
        result.rows.len(),
        result.pagination,
        result.rows,
    )))
}

/// 리뷰 단건 조회.
///
/// GET /api/v1/reviews/{id}
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    let doc = ReviewRepository::document_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Envelope::ok(doc)))
}

/// 특정 부트캠프의 리뷰 목록 조회.
///
/// GET /api/v1/bootcamps/{id}/reviews
pub async fn list_for_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(bootcamp_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    BootcampRepository::find_by_id(state.pool()?, bootcamp_id)
        .await?
        .ok_or_else(|| bootcamp_not_found(bootcamp_id))?;

    let rows = ReviewRepository::documents_by_bootcamp(state.pool()?, bootcamp_id).await?;
    Ok(Json(Envelope::counted(rows.len(), rows)))
}

/// 리뷰 작성. user|admin.
///
/// 한 사용자는 부트캠프당 하나의 리뷰만 작성할 수 있습니다.
///
/// POST /api/v1/bootcamps/{id}/reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(bootcamp_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Envelope<Value>>)> {
    require_role(&user, &[Role::User, Role::Admin])?;
    if !body.is_object() {
        return Err(ApiError::Validation(
            "요청 본문은 JSON 객체여야 합니다".to_string(),
        ));
    }

    BootcampRepository::find_by_id(state.pool()?, bootcamp_id)
        .await?
        .ok_or_else(|| bootcamp_not_found(bootcamp_id))?;

    // 중복 리뷰는 unique 제약 위반(23505)으로 400 처리됨
    let record = ReviewRepository::create(state.pool()?, bootcamp_id, user.id, body).await?;
    record_document_write("reviews", "create");
    tracing::info!(review_id = %record.id, bootcamp_id = %bootcamp_id, "리뷰 작성됨");

    Ok((StatusCode::CREATED, Json(Envelope::ok(record.document()))))
}

/// 리뷰 수정. 작성자 또는 admin.
///
/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::User, Role::Admin])?;
    if !body.is_object() {
        return Err(ApiError::Validation(
            "요청 본문은 JSON 객체여야 합니다".to_string(),
        ));
    }

    owned_review(&state, &user, id).await?;

    let updated = ReviewRepository::merge_data(state.pool()?, id, body)
        .await?
        .ok_or_else(|| not_found(id))?;
    record_document_write("reviews", "update");

    Ok(Json(Envelope::ok(updated.document())))
}

/// 리뷰 삭제. 작성자 또는 admin.
///
/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::User, Role::Admin])?;

    owned_review(&state, &user, id).await?;

    ReviewRepository::delete(state.pool()?, id).await?;
    record_document_write("reviews", "delete");

    Ok(Json(Envelope::ok(serde_json::json!({}))))
}

/// 조회 + 작성자 검사.
async fn owned_review(
    state: &AppState,
    user: &crate::repository::UserRecord,
    id: Uuid,
) -> ApiResult<ReviewRecord> {
    let record = ReviewRepository::find_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !can_mutate(user.role, user.id, record.user_id) {
        return Err(ApiError::Forbidden(
            "이 리뷰를 수정할 권한이 없습니다".to_string(),
        ));
    }

    Ok(record)
}

/// 리뷰 라우터 생성 (최상위 경로).
pub fn reviews_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_reviews))
        .route(
            "/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
}
