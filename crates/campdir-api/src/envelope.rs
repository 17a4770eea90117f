//! 통합 성공 응답 봉투.
//!
//! 모든 핸들러는 `{"success": true, "data": ..., "count"?, "pagination"?}`
//! 형태의 동일한 봉투로 응답합니다.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 목록 응답의 페이지네이션 메타데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// 현재 페이지 (1부터 시작)
    pub page: i64,
    /// 페이지 크기
    pub limit: i64,
    /// 페이지네이션 전 전체 매칭 건수
    pub total: i64,
    /// 전체 페이지 수
    pub total_pages: i64,
    /// 다음 페이지 번호 (있는 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<i64>,
    /// 이전 페이지 번호 (있는 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<i64>,
}

impl Pagination {
    /// 전체 건수와 페이지 윈도우에서 메타데이터 계산.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        let skip = (page - 1) * limit;

        Self {
            page,
            limit,
            total,
            total_pages,
            next: if skip + limit < total {
                Some(page + 1)
            } else {
                None
            },
            prev: if page > 1 { Some(page - 1) } else { None },
        }
    }
}

/// 통합 성공 응답 봉투.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    /// 항상 true
    pub success: bool,
    /// 반환된 항목 수 (목록 응답)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// 페이지네이션 메타데이터 (목록 응답)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// 응답 데이터
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// 단건 응답.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            data,
        }
    }

    /// 건수만 포함하는 목록 응답 (페이지네이션 없음).
    pub fn counted(count: usize, data: T) -> Self {
        Self {
            success: true,
            count: Some(count),
            pagination: None,
            data,
        }
    }

    /// 목록 응답 (건수 + 페이지네이션 포함).
    pub fn list(count: usize, pagination: Pagination, data: T) -> Self {
        Self {
            success: true,
            count: Some(count),
            pagination: Some(pagination),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_first_page() {
        let p = Pagination::new(1, 10, 35);
        assert_eq!(p.total_pages, 4);
        assert_eq!(p.next, Some(2));
        assert_eq!(p.prev, None);
    }

    #[test]
    fn test_pagination_middle_page() {
        let p = Pagination::new(2, 10, 35);
        assert_eq!(p.next, Some(3));
        assert_eq!(p.prev, Some(1));
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(4, 10, 35);
        assert_eq!(p.next, None);
        assert_eq!(p.prev, Some(3));
    }

    #[test]
    fn test_pagination_empty_result() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.next, None);
        assert_eq!(p.prev, None);
    }

    #[test]
    fn test_envelope_single() {
        let env = Envelope::ok(serde_json::json!({"name": "Devworks"}));
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(!json.contains("count"));
        assert!(!json.contains("pagination"));
    }

    #[test]
    fn test_envelope_list() {
        let env = Envelope::list(2, Pagination::new(1, 2, 5), vec![1, 2]);
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains(r#""count":2"#));
        assert!(json.contains(r#""total":5"#));
        assert!(json.contains(r#""next":2"#));
    }
}
