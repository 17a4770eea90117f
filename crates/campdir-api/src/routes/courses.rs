//! 코스 endpoints.
//!
//! 최상위 목록/단건과 부트캠프 중첩 경로의 생성·목록을 처리합니다.
//! 목록 응답은 소속 부트캠프의 이름/설명을 하위 객체로 포함합니다.

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
use crate::repository::{BootcampRepository, CourseRecord, CourseRepository};
use crate::state::AppState;

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("코스를 찾을 수 없습니다: {}", id))
}

fn bootcamp_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("부트캠프를 찾을 수 없습니다: {}", id))
}

/// 코스 전체 목록 조회. 부트캠프 이름/설명 populate.
///
/// GET /api/v1/courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    let desc = QueryDescriptor::from_params(&params)?;
    let result = run_list_query(
        state.pool()?,
        Collection::Courses,
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

/// 코스 단건 조회.
///
/// GET /api/v1/courses/{id}
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    let doc = CourseRepository::document_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Envelope::ok(doc)))
}

/// 특정 부트캠프의 코스 목록 조회.
///
/// GET /api/v1/bootcamps/{id}/courses
pub async fn list_for_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(bootcamp_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    BootcampRepository::find_by_id(state.pool()?, bootcamp_id)
        .await?
        .ok_or_else(|| bootcamp_not_found(bootcamp_id))?;

    let rows = CourseRepository::documents_by_bootcamp(state.pool()?, bootcamp_id).await?;
    Ok(Json(Envelope::counted(rows.len(), rows)))
}

/// 코스 생성. publisher|admin + 부트캠프 소유권.
///
/// POST /api/v1/bootcamps/{id}/courses
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(bootcamp_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Envelope<Value>>)> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;
    if !body.is_object() {
        return Err(ApiError::Validation(
            "요청 본문은 JSON 객체여야 합니다".to_string(),
        ));
    }

    let bootcamp = BootcampRepository::find_by_id(state.pool()?, bootcamp_id)
        .await?
        .ok_or_else(|| bootcamp_not_found(bootcamp_id))?;

    // 코스는 부트캠프 소유자만 추가할 수 있음
    if !can_mutate(user.role, user.id, bootcamp.user_id) {
        return Err(ApiError::Forbidden(
            "이 부트캠프에 코스를 추가할 권한이 없습니다".to_string(),
        ));
    }

    let record = CourseRepository::create(state.pool()?, bootcamp_id, user.id, body).await?;
    record_document_write("courses", "create");
    tracing::info!(course_id = %record.id, bootcamp_id = %bootcamp_id, "코스 생성됨");

    Ok((StatusCode::CREATED, Json(Envelope::ok(record.document()))))
}

/// 코스 수정. 소유자 또는 admin.
///
/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;
    if !body.is_object() {
        return Err(ApiError::Validation(
            "요청 본문은 JSON 객체여야 합니다".to_string(),
        ));
    }

    owned_course(&state, &user, id).await?;

    let updated = CourseRepository::merge_data(state.pool()?, id, body)
        .await?
        .ok_or_else(|| not_found(id))?;
    record_document_write("courses", "update");

    Ok(Json(Envelope::ok(updated.document())))
}

/// 코스 삭제. 소유자 또는 admin.
///
/// DELETE /api/v1/courses/{id}
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;

    owned_course(&state, &user, id).await?;

    CourseRepository::delete(state.pool()?, id).await?;
    record_document_write("courses", "delete");

    Ok(Json(Envelope::ok(serde_json::json!({}))))
}

/// 조회 + 소유권 검사.
async fn owned_course(
    state: &AppState,
    user: &crate::repository::UserRecord,
    id: Uuid,
) -> ApiResult<CourseRecord> {
    let record = CourseRepository::find_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !can_mutate(user.role, user.id, record.user_id) {
        return Err(ApiError::Forbidden(
            "이 코스를 수정할 권한이 없습니다".to_string(),
        ));
    }

    Ok(record)
}

/// 코스 라우터 생성 (최상위 경로).
pub fn courses_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_courses))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest("/api/v1/courses", courses_router())
            .with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_update_requires_auth() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/v1/courses/123e4567-e89b-12d3-a456-426614174000")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_requires_auth() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/v1/courses/123e4567-e89b-12d3-a456-426614174000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
