//! Bootcamp repository.
//!
//! 부트캠프 문서 생성, 조회, 수정, 반경 검색을 처리합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::query::{Collection, Populate};

/// 지구 반지름 (마일). 반경 검색의 라디안 환산에 사용.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// 부트캠프 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BootcampRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl BootcampRecord {
    /// 응답 문서로 변환 (data + id/user/createdAt 병합).
    pub fn document(&self) -> Value {
        let mut doc = self.data.clone();
        if let Value::Object(map) = &mut doc {
            map.insert("id".to_string(), Value::String(self.id.to_string()));
            map.insert("user".to_string(), Value::String(self.user_id.to_string()));
            map.insert(
                "createdAt".to_string(),
                Value::String(self.created_at.to_rfc3339()),
            );
        }
        doc
    }
}

/// 부트캠프 저장소.
pub struct BootcampRepository;

impl BootcampRepository {
    /// 새 부트캠프 생성.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: Value,
    ) -> Result<BootcampRecord, sqlx::Error> {
        sqlx::query_as::<_, BootcampRecord>(
            r#"
            INSERT INTO bootcamps (user_id, data)
            VALUES ($1, $2)
            RETURNING id, user_id, data, created_at
            "#,
        )
        .bind(user_id)
        .bind(data)
        .fetch_one(pool)
        .await
    }

    /// ID로 조회.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<BootcampRecord>, sqlx::Error> {
        sqlx::query_as::<_, BootcampRecord>(
            "SELECT id, user_id, data, created_at FROM bootcamps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// 소유자가 게시한 부트캠프 조회 (퍼블리셔 1인 1캠프 제한용).
    pub async fn find_one_by_owner(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<BootcampRecord>, sqlx::Error> {
        sqlx::query_as::<_, BootcampRecord>(
            "SELECT id, user_id, data, created_at FROM bootcamps WHERE user_id = $1 LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// 문서 부분 수정. 전달된 필드만 덮어씁니다 (jsonb 병합).
    pub async fn merge_data(
        pool: &PgPool,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<BootcampRecord>, sqlx::Error> {
        sqlx::query_as::<_, BootcampRecord>(
            r#"
            UPDATE bootcamps
            SET data = data || $2
            WHERE id = $1
            RETURNING id, user_id, data, created_at
            "#,
        )
        .bind(id)
        .bind(patch)
        .fetch_optional(pool)
        .await
    }

    /// 삭제. 존재하지 않으면 false. 하위 문서는 연쇄 삭제하지 않습니다.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 중심 좌표에서 대원거리(great-circle) 반경 내 부트캠프 조회.
    ///
    /// `distance_miles / EARTH_RADIUS_MILES` 라디안을 한계로 사용합니다.
    /// 좌표 필드가 없는 문서는 제외됩니다.
    pub async fn within_radius(
        pool: &PgPool,
        latitude: f64,
        longitude: f64,
        distance_miles: f64,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let max_radians = distance_miles / EARTH_RADIUS_MILES;
        let doc_expr = Collection::Bootcamps.doc_expr(None);

        let sql = format!(
            r#"
            SELECT {doc_expr}
            FROM bootcamps t
            WHERE (t.data ? 'latitude') AND (t.data ? 'longitude')
              AND acos(least(1.0, greatest(-1.0,
                    sin(radians($1)) * sin(radians((t.data ->> 'latitude')::float8))
                  + cos(radians($1)) * cos(radians((t.data ->> 'latitude')::float8))
                  * cos(radians((t.data ->> 'longitude')::float8) - radians($2))
                  ))) <= $3
            ORDER BY t.created_at DESC
            "#
        );

        sqlx::query_scalar::<_, Value>(&sql)
            .bind(latitude)
            .bind(longitude)
            .bind(max_radians)
            .fetch_all(pool)
            .await
    }
}
