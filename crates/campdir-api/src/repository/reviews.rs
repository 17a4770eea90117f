//! Review repository.
//!
//! 부트캠프당 사용자별 1건 제약은 unique_review_per_user 제약으로
//! 데이터베이스에서 강제됩니다 (위반 시 23505 → 400).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::query::{Collection, Populate};

/// 리뷰 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// 응답 문서로 변환 (data + id/user/bootcamp/createdAt 병합).
    pub fn document(&self) -> Value {
        let mut doc = self.data.clone();
        if let Value::Object(map) = &mut doc {
            map.insert("id".to_string(), Value::String(self.id.to_string()));
            map.insert("user".to_string(), Value::String(self.user_id.to_string()));
            map.insert(
                "bootcamp".to_string(),
                Value::String(self.bootcamp_id.to_string()),
            );
            map.insert(
                "createdAt".to_string(),
                Value::String(self.created_at.to_rfc3339()),
            );
        }
        doc
    }
}

/// 리뷰 저장소.
pub struct ReviewRepository;

impl ReviewRepository {
    /// 새 리뷰 생성.
    pub async fn create(
        pool: &PgPool,
        bootcamp_id: Uuid,
        user_id: Uuid,
        data: Value,
    ) -> Result<ReviewRecord, sqlx::Error> {
        sqlx::query_as::<_, ReviewRecord>(
            r#"
            INSERT INTO reviews (bootcamp_id, user_id, data)
            VALUES ($1, $2, $3)
            RETURNING id, bootcamp_id, user_id, data, created_at
            "#,
        )
        .bind(bootcamp_id)
        .bind(user_id)
        .bind(data)
        .fetch_one(pool)
        .await
    }

    /// ID로 레코드 조회 (소유권 검사용).
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ReviewRecord>, sqlx::Error> {
        sqlx::query_as::<_, ReviewRecord>(
            "SELECT id, bootcamp_id, user_id, data, created_at FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// ID로 응답 문서 조회 (부트캠프 이름/설명 populate).
    pub async fn document_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
        let doc_expr = Collection::Reviews.doc_expr(Some(&Populate::bootcamp()));
        let sql = format!("SELECT {doc_expr} FROM reviews t WHERE t.id = $1");

        sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 특정 부트캠프의 리뷰 문서 전체 조회 (페이지네이션 없음).
    pub async fn documents_by_bootcamp(
        pool: &PgPool,
        bootcamp_id: Uuid,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let doc_expr = Collection::Reviews.doc_expr(None);
        let sql = format!(
            "SELECT {doc_expr} FROM reviews t \
             WHERE t.bootcamp_id = $1 ORDER BY t.created_at DESC"
        );

        sqlx::query_scalar::<_, Value>(&sql)
            .bind(bootcamp_id)
            .fetch_all(pool)
            .await
    }

    /// 문서 부분 수정 (jsonb 병합).
    pub async fn merge_data(
        pool: &PgPool,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<ReviewRecord>, sqlx::Error> {
        sqlx::query_as::<_, ReviewRecord>(
            r#"
            UPDATE reviews
            SET data = data || $2
            WHERE id = $1
            RETURNING id, bootcamp_id, user_id, data, created_at
            "#,
        )
        .bind(id)
        .bind(patch)
        .fetch_optional(pool)
        .await
    }

    /// 삭제. 존재하지 않으면 false.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
