//! 쿼리 실행 계획.
//!
//! 디스크립터를 명명된 컬렉션에 대한 SQL로 변환해 실행합니다.
//! 컬렉션은 닫힌 enum이고, 필터 키/값은 전부 바인딩 파라미터로
//! 전달됩니다 (식별자 보간 없음).

use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::descriptor::{Filter, FilterOp, QueryDescriptor};
use crate::envelope::Pagination;
use crate::error::ApiError;

/// 질의 가능한 컬렉션.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Bootcamps,
    Courses,
    Reviews,
    Users,
}

impl Collection {
    /// 테이블 이름.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Bootcamps => "bootcamps",
            Collection::Courses => "courses",
            Collection::Reviews => "reviews",
            Collection::Users => "users",
        }
    }

    /// 행을 응답 문서(jsonb)로 만드는 SQL 식. 테이블 별칭은 `t`.
    ///
    /// users는 구조화된 컬럼에서 문서를 구성하며
    /// 비밀번호/재설정 토큰 컬럼은 절대 포함하지 않습니다.
    pub(crate) fn doc_expr(&self, populate: Option<&Populate>) -> String {
        match self {
            Collection::Bootcamps => "t.data || jsonb_build_object(\
                 'id', t.id, 'user', t.user_id, 'createdAt', t.created_at)"
                .to_string(),
            Collection::Courses | Collection::Reviews => {
                let bootcamp_expr = match populate {
                    Some(p) => p.sub_object_expr(),
                    None => "to_jsonb(t.bootcamp_id)".to_string(),
                };
                format!(
                    "t.data || jsonb_build_object(\
                     'id', t.id, 'user', t.user_id, 'createdAt', t.created_at, \
                     'bootcamp', {bootcamp_expr})"
                )
            }
            Collection::Users => "jsonb_build_object(\
                 'id', t.id, 'name', t.name, 'email', t.email, \
                 'role', t.role, 'createdAt', t.created_at)"
                .to_string(),
        }
    }
}

/// 참조된 부트캠프를 하위 객체로 인라인하는 populate 설정.
///
/// 필드 목록은 코드에서 고정적으로 구성됩니다 (사용자 입력 아님).
#[derive(Debug, Clone, Copy)]
pub struct Populate {
    fields: &'static [&'static str],
}

impl Populate {
    /// 부트캠프 이름/설명 populate (코스·리뷰 목록의 기본).
    pub fn bootcamp() -> Self {
        Self {
            fields: &["name", "description"],
        }
    }

    fn sub_object_expr(&self) -> String {
        let mut expr = String::from("(SELECT jsonb_build_object('id', b.id");
        for field in self.fields {
            expr.push_str(&format!(", '{field}', b.data -> '{field}'"));
        }
        expr.push_str(") FROM bootcamps b WHERE b.id = t.bootcamp_id)");
        expr
    }
}

/// 목록 질의 결과.
#[derive(Debug)]
pub struct ListResult {
    /// 페이지네이션 전 전체 매칭 건수
    pub total: i64,
    /// 페이지네이션 메타데이터
    pub pagination: Pagination,
    /// 결과 페이지 (응답 문서)
    pub rows: Vec<Value>,
}

/// 필터 조건을 WHERE 절로 추가.
fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filters: &[Filter]) {
    for (i, f) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });

        match f.op {
            FilterOp::Eq => {
                qb.push("(d.doc ->> ");
                qb.push_bind(f.field.clone());
                qb.push("::text) = ");
                qb.push_bind(f.value.clone());
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                // 숫자 비교. 캐스팅 실패(22P02)는 400으로 매핑됨
                let op_sql = match f.op {
                    FilterOp::Gt => ">",
                    FilterOp::Gte => ">=",
                    FilterOp::Lt => "<",
                    FilterOp::Lte => "<=",
                    _ => unreachable!(),
                };
                qb.push("(d.doc ->> ");
                qb.push_bind(f.field.clone());
                qb.push("::text)::numeric ");
                qb.push(op_sql);
                qb.push(" ");
                qb.push_bind(f.value.clone());
                qb.push("::numeric");
            }
            FilterOp::In => {
                let values: Vec<String> =
                    f.value.split(',').map(|v| v.trim().to_string()).collect();
                qb.push("(d.doc ->> ");
                qb.push_bind(f.field.clone());
                qb.push("::text) = ANY(");
                qb.push_bind(values);
                qb.push(")");
            }
        }
    }
}

fn count_builder(
    collection: Collection,
    populate: Option<&Populate>,
    filters: &[Filter],
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM (SELECT ");
    qb.push(collection.doc_expr(populate));
    qb.push(" AS doc FROM ");
    qb.push(collection.table());
    qb.push(" t) d");
    push_filters(&mut qb, filters);
    qb
}

fn page_builder(
    collection: Collection,
    populate: Option<&Populate>,
    desc: &QueryDescriptor,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT d.doc FROM (SELECT ");
    qb.push(collection.doc_expr(populate));
    qb.push(" AS doc FROM ");
    qb.push(collection.table());
    qb.push(" t) d");
    push_filters(&mut qb, &desc.filters);

    // jsonb 값 순서 사용: 숫자는 수치, 문자열은 사전식으로 정렬됨
    qb.push(" ORDER BY ");
    for (i, key) in desc.sort.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push("d.doc -> ");
        qb.push_bind(key.field.clone());
        qb.push("::text");
        qb.push(if key.descending { " DESC" } else { " ASC" });
    }

    qb.push(" LIMIT ");
    qb.push_bind(desc.limit);
    qb.push(" OFFSET ");
    qb.push_bind(desc.skip());
    qb
}

/// 선택된 필드만 남기는 프로젝션. id는 암묵적으로 제외되지 않습니다.
fn project(doc: &mut Value, select: &[String]) {
    if let Value::Object(map) = doc {
        map.retain(|k, _| k == "id" || select.iter().any(|s| s == k));
    }
}

/// 디스크립터를 컬렉션에 대해 실행.
///
/// 페이지네이션 전 전체 건수와 결과 페이지를 반환합니다.
pub async fn run_list_query(
    pool: &PgPool,
    collection: Collection,
    desc: &QueryDescriptor,
    populate: Option<&Populate>,
) -> Result<ListResult, ApiError> {
    let total: i64 = count_builder(collection, populate, &desc.filters)
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut rows: Vec<Value> = page_builder(collection, populate, desc)
        .build_query_scalar()
        .fetch_all(pool)
        .await?;

    if let Some(select) = &desc.select {
        for row in &mut rows {
            project(row, select);
        }
    }

    Ok(ListResult {
        total,
        pagination: Pagination::new(desc.page, desc.limit, total),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn descriptor(pairs: &[(&str, &str)]) -> QueryDescriptor {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryDescriptor::from_params(&params).unwrap()
    }

    #[test]
    fn test_count_sql_shape() {
        let desc = descriptor(&[("housing", "true"), ("averageCost[lte]", "10000")]);
        let qb = count_builder(Collection::Bootcamps, None, &desc.filters);
        let sql = qb.sql();

        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("FROM bootcamps t"));
        // 필터 키/값은 모두 바인딩 파라미터
        assert!(sql.contains("$1"));
        assert!(sql.contains("$4"));
        assert!(sql.contains("::numeric"));
        assert!(!sql.contains("housing"));
        assert!(!sql.contains("10000"));
    }

    #[test]
    fn test_page_sql_orders_and_paginates() {
        let desc = descriptor(&[("sort", "-name"), ("page", "2"), ("limit", "10")]);
        let qb = page_builder(Collection::Courses, None, &desc);
        let sql = qb.sql();

        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn test_page_sql_always_has_sort_key() {
        // 정렬 키가 비는 입력도 기본 정렬로 대체되어 ORDER BY 뒤가 비지 않음
        let desc = descriptor(&[("sort", ",")]);
        let qb = page_builder(Collection::Bootcamps, None, &desc);
        let sql = qb.sql();

        assert!(sql.contains("ORDER BY d.doc -> $1"));
        assert!(!sql.contains("ORDER BY  LIMIT"));
    }

    #[test]
    fn test_in_filter_uses_any() {
        let desc = descriptor(&[("careers[in]", "Business,UI/UX")]);
        let qb = count_builder(Collection::Bootcamps, None, &desc.filters);
        assert!(qb.sql().contains("= ANY("));
    }

    #[test]
    fn test_populate_expr_inlines_bootcamp_fields() {
        let expr = Collection::Courses.doc_expr(Some(&Populate::bootcamp()));
        assert!(expr.contains("'name', b.data -> 'name'"));
        assert!(expr.contains("'description', b.data -> 'description'"));
        assert!(expr.contains("WHERE b.id = t.bootcamp_id"));
    }

    #[test]
    fn test_users_doc_never_exposes_credentials() {
        let expr = Collection::Users.doc_expr(None);
        assert!(!expr.contains("password"));
        assert!(!expr.contains("reset"));
        assert!(expr.contains("'email', t.email"));
    }

    #[test]
    fn test_projection_keeps_id() {
        let mut doc = serde_json::json!({
            "id": "abc",
            "name": "Devworks",
            "description": "설명",
            "housing": true
        });
        project(&mut doc, &["name".to_string()]);

        let obj = doc.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("name"));
        assert!(!obj.contains_key("housing"));
    }
}
