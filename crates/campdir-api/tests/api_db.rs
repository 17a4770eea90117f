//! 데이터베이스 통합 테스트.
//!
//! 실제 PostgreSQL이 필요하므로 기본적으로 ignore 처리되어 있습니다.
//! DATABASE_URL을 설정한 뒤 `cargo test -- --ignored`로 실행하세요.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use campdir_api::auth::{create_token, hash_password, Claims, Role};
use campdir_api::repository::{NewUser, UserRepository};
use campdir_api::routes::create_api_router;
use campdir_api::state::AppState;
use campdir_core::AppConfig;

async fn setup() -> (Router, sqlx::PgPool, AppState) {
    let database_url =
        std::env::var("DATABASE_URL").expect("통합 테스트에는 DATABASE_URL이 필요합니다");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("데이터베이스 연결 실패");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("마이그레이션 실패");

    let state = AppState::new(AppConfig::default()).with_db_pool(pool.clone());
    let router = create_api_router().with_state(Arc::new(state.clone()));
    (router, pool, state)
}

async fn create_user(pool: &sqlx::PgPool, role: Role) -> campdir_api::repository::UserRecord {
    let password_hash = hash_password("123456", 19456, 2).unwrap();
    UserRepository::create(
        pool,
        NewUser {
            name: "통합 테스트".to_string(),
            email: format!("it-{}@example.com", Uuid::new_v4()),
            role,
            password_hash,
        },
    )
    .await
    .unwrap()
}

fn bearer_token(state: &AppState, user: &campdir_api::repository::UserRecord) -> String {
    let claims = Claims::new(
        user.id.to_string(),
        user.role,
        state.config.auth.token_ttl_minutes,
    );
    create_token(&claims, &state.config.auth.jwt_secret).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_token_for_deleted_user_is_unauthorized() {
    let (router, pool, state) = setup().await;

    // 유효한 토큰 발급 후 사용자 삭제
    let user = create_user(&pool, Role::User).await;
    let token = bearer_token(&state, &user);
    assert!(UserRepository::delete(&pool, user.id).await.unwrap());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // 서명이 유효해도 주체가 사라졌으면 동일한 401
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_delete_nonexistent_user_is_404() {
    let (router, pool, state) = setup().await;

    let admin = create_user(&pool, Role::Admin).await;
    let token = bearer_token(&state, &admin);

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/v1/users/{}", Uuid::new_v4()))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    UserRepository::delete(&pool, admin.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_register_then_me_round_trip() {
    let (router, pool, _state) = setup().await;

    let email = format!("it-{}@example.com", Uuid::new_v4());
    let body = serde_json::json!({
        "name": "홍길동",
        "email": email,
        "password": "123456"
    });

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let token = json["token"].as_str().unwrap().to_string();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["email"].as_str().unwrap(), email);

    let user = UserRepository::find_by_email(&pool, &email).await.unwrap().unwrap();
    UserRepository::delete(&pool, user.id).await.unwrap();
}
