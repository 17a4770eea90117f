//! 부트캠프 endpoints.
//!
//! CRUD, 반경 검색, 사진 업로드와 코스/리뷰 중첩 라우트를 제공합니다.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, put},
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
use crate::query::{run_list_query, Collection, QueryDescriptor};
use crate::repository::{BootcampRecord, BootcampRepository};
use crate::services::upload;
use crate::state::AppState;

use super::{courses, reviews};

/// 본문이 JSON 객체인지 확인.
fn require_object(body: &Value) -> Result<(), ApiError> {
    if body.is_object() {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "요청 본문은 JSON 객체여야 합니다".to_string(),
        ))
    }
}

/// 부트캠프 목록 조회. 필터/정렬/페이지네이션/필드선택 지원.
///
/// GET /api/v1/bootcamps
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    tag = "bootcamps",
    params(
        ("select" = Option<String>, Query, description = "반환 필드 제한 (쉼표 구분)"),
        ("sort" = Option<String>, Query, description = "정렬 키 (쉼표 구분, - 접두사는 내림차순)"),
        ("page" = Option<i64>, Query, description = "페이지 번호"),
        ("limit" = Option<i64>, Query, description = "페이지 크기")
    ),
    responses(
        (status = 200, description = "부트캠프 목록 (success/count/pagination/data 봉투)"),
        (status = 400, description = "잘못된 필터", body = crate::error::ErrorBody)
    )
)]
pub async fn list_bootcamps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    let desc = QueryDescriptor::from_params(&params)?;
    let result = run_list_query(state.pool()?, Collection::Bootcamps, &desc, None).await?;

    Ok(Json(Envelope::list(
        result.rows.len(),
        result.pagination,
        result.rows,
    )))
}

/// 부트캠프 단건 조회.
///
/// GET /api/v1/bootcamps/{id}
pub async fn get_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    let record = BootcampRepository::find_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Envelope::ok(record.document())))
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("부트캠프를 찾을 수 없습니다: {}", id))
}

/// 부트캠프 생성. publisher|admin 전용.
///
/// publisher는 한 개의 부트캠프만 게시할 수 있습니다.
/// 지오코더가 설정되어 있고 본문에 address가 있으면 좌표를 채웁니다.
///
/// POST /api/v1/bootcamps
pub async fn create_bootcamp(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(mut body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Envelope<Value>>)> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;
    require_object(&body)?;

    if user.role == Role::Publisher {
        let existing = BootcampRepository::find_one_by_owner(state.pool()?, user.id).await?;
        if existing.is_some() {
            return Err(ApiError::Validation(
                "이미 부트캠프를 게시했습니다".to_string(),
            ));
        }
    }

    geocode_address(&state, &mut body).await;

    let record = BootcampRepository::create(state.pool()?, user.id, body).await?;
    record_document_write("bootcamps", "create");
    tracing::info!(bootcamp_id = %record.id, user_id = %user.id, "부트캠프 생성됨");

    Ok((StatusCode::CREATED, Json(Envelope::ok(record.document()))))
}

/// 본문의 address를 좌표로 변환해 채워 넣습니다.
///
/// 지오코더 미설정이거나 변환 실패 시 좌표 없이 진행합니다.
async fn geocode_address(state: &AppState, body: &mut Value) {
    let Some(geocoder) = &state.geocoder else {
        return;
    };
    let Some(address) = body.get("address").and_then(|a| a.as_str()) else {
        return;
    };

    match geocoder.geocode(address).await {
        Ok(point) => {
            if let Value::Object(map) = body {
                map.insert("latitude".to_string(), serde_json::json!(point.latitude));
                map.insert("longitude".to_string(), serde_json::json!(point.longitude));
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "주소 지오코딩 실패, 좌표 없이 저장");
        }
    }
}

/// 부트캠프 수정. 소유자 또는 admin.
///
/// PUT /api/v1/bootcamps/{id}
pub async fn update_bootcamp(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;
    require_object(&body)?;

    let record = owned_bootcamp(&state, &user, id).await?;

    let updated = BootcampRepository::merge_data(state.pool()?, record.id, body)
        .await?
        .ok_or_else(|| not_found(id))?;
    record_document_write("bootcamps", "update");

    Ok(Json(Envelope::ok(updated.document())))
}

/// 부트캠프 삭제. 소유자 또는 admin. 하위 문서는 연쇄 삭제하지 않습니다.
///
/// DELETE /api/v1/bootcamps/{id}
pub async fn delete_bootcamp(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Value>>> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;

    owned_bootcamp(&state, &user, id).await?;

    BootcampRepository::delete(state.pool()?, id).await?;
    record_document_write("bootcamps", "delete");
    tracing::info!(bootcamp_id = %id, "부트캠프 삭제됨");

    Ok(Json(Envelope::ok(serde_json::json!({}))))
}

/// 조회 + 소유권 검사. 404와 403을 구분합니다.
async fn owned_bootcamp(
    state: &AppState,
    user: &crate::repository::UserRecord,
    id: Uuid,
) -> ApiResult<BootcampRecord> {
    let record = BootcampRepository::find_by_id(state.pool()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !can_mutate(user.role, user.id, record.user_id) {
        return Err(ApiError::Forbidden(
            "이 부트캠프를 수정할 권한이 없습니다".to_string(),
        ));
    }

    Ok(record)
}

/// 우편번호/주소 기준 반경 내 부트캠프 조회.
///
/// GET /api/v1/bootcamps/radius/{zipcode}/{distance}
pub async fn bootcamps_in_radius(
    State(state): State<Arc<AppState>>,
    Path((zipcode, distance)): Path<(String, f64)>,
) -> ApiResult<Json<Envelope<Vec<Value>>>> {
    if distance <= 0.0 {
        return Err(ApiError::Validation(
            "반경은 0보다 커야 합니다".to_string(),
        ));
    }

    let geocoder = state.geocoder.as_ref().ok_or_else(|| {
        ApiError::Upstream("지오코딩 서비스가 설정되지 않았습니다".to_string())
    })?;

    let point = geocoder.geocode(&zipcode).await?;
    let rows = BootcampRepository::within_radius(
        state.pool()?,
        point.latitude,
        point.longitude,
        distance,
    )
    .await?;

    Ok(Json(Envelope::counted(rows.len(), rows)))
}

/// 부트캠프 사진 업로드. 소유자 또는 admin.
///
/// 파일 기록이 완료된 뒤에 응답합니다.
///
/// PUT /api/v1/bootcamps/{id}/photo
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Envelope<String>>> {
    require_role(&user, &[Role::Publisher, Role::Admin])?;

    owned_bootcamp(&state, &user, id).await?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::Validation("Content-Type 헤더가 필요합니다".to_string())
        })?;
    let ext = upload::image_extension(content_type)?;
    upload::check_size(body.len(), state.config.uploads.max_size_bytes)?;

    let filename = format!("photo_{id}.{ext}");
    upload::save_file(&state.config.uploads.dir, &filename, &body).await?;

    BootcampRepository::merge_data(state.pool()?, id, serde_json::json!({ "photo": filename }))
        .await?
        .ok_or_else(|| not_found(id))?;
    record_document_write("bootcamps", "update");

    Ok(Json(Envelope::ok(filename)))
}

/// 부트캠프 라우터 생성. 코스/리뷰 중첩 라우트를 포함합니다.
pub fn bootcamps_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_bootcamps).post(create_bootcamp))
        .route("/radius/{zipcode}/{distance}", get(bootcamps_in_radius))
        .route(
            "/{id}",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route("/{id}/photo", put(upload_photo))
        .route(
            "/{id}/courses",
            get(courses::list_for_bootcamp).post(courses::create_course),
        )
        .route(
            "/{id}/reviews",
            get(reviews::list_for_bootcamp).post(reviews::create_review),
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
            .nest("/api/v1/bootcamps", bootcamps_router())
            .with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_create_requires_auth() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/bootcamps")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_photo_upload_requires_auth() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/v1/bootcamps/123e4567-e89b-12d3-a456-426614174000/photo")
                    .header("content-type", "image/png")
                    .body(Body::from(vec![0u8; 16]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_object_rejects_non_object() {
        assert!(require_object(&serde_json::json!([1, 2])).is_err());
        assert!(require_object(&serde_json::json!("text")).is_err());
        assert!(require_object(&serde_json::json!({"name": "Devworks"})).is_ok());
    }
}
