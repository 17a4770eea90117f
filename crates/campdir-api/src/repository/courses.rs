//! Course repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::query::{Collection, Populate};

/// 코스 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRecord {
    pub id: Uuid,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl CourseRecord {
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

/// 코스 저장소.
pub struct CourseRepository;

impl CourseRepository {
    /// 새 코스 생성.
    pub async fn create(
        pool: &PgPool,
        bootcamp_id: Uuid,
        user_id: Uuid,
        data: Value,
    ) -> Result<CourseRecord, sqlx::Error> {
        sqlx::query_as::<_, CourseRecord>(
            r#"
            INSERT INTO courses (bootcamp_id, user_id, data)
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
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<CourseRecord>, sqlx::Error> {
        sqlx::query_as::<_, CourseRecord>(
            "SELECT id, bootcamp_id, user_id, data, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// ID로 응답 문서 조회 (부트캠프 이름/설명 populate).
    pub async fn document_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
        let doc_expr = Collection::Courses.doc_expr(Some(&Populate::bootcamp()));
        let sql = format!("SELECT {doc_expr} FROM courses t WHERE t.id = $1");

        sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 특정 부트캠프의 코스 문서 전체 조회 (페이지네이션 없음).
    pub async fn documents_by_bootcamp(
        pool: &PgPool,
        bootcamp_id: Uuid,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let doc_expr = Collection::Courses.doc_expr(None);
        let sql = format!(
            "SELECT {doc_expr} FROM courses t \
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
    ) -> Result<Option<CourseRecord>, sqlx::Error> {
        sqlx::query_as::<_, CourseRecord>(
            r#"
            UPDATE courses
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
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
