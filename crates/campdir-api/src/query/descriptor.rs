//! 쿼리 디스크립터.
//!
//! 목록 요청의 URL 파라미터를 필터/정렬/페이지네이션/필드선택
//! 의도로 파싱합니다. 요청마다 새로 만들어지며 저장되지 않습니다.

use std::collections::HashMap;

use crate::error::ApiError;

/// 기본 페이지 번호.
pub const DEFAULT_PAGE: i64 = 1;
/// 기본 페이지 크기.
pub const DEFAULT_LIMIT: i64 = 100;
/// 최대 페이지 번호. 초과분은 잘립니다 (skip 계산 오버플로 방지).
pub const MAX_PAGE: i64 = 1_000_000;
/// 최대 페이지 크기.
pub const MAX_LIMIT: i64 = 1_000;
/// 기본 정렬 (최신순).
pub const DEFAULT_SORT: &str = "-createdAt";

/// 예약 키. 필터 집합을 만들기 전에 추출/제거됩니다.
const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// 비교 연산자.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    /// 브래킷 세그먼트의 연산자 토큰 매칭.
    ///
    /// 토큰 단위 텍스트 매칭입니다. 타입 인식 파싱이 아니므로
    /// 우연히 같은 토큰을 담은 키도 재작성됩니다 (알려진 한계).
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// 단일 필터 조건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// 정렬 키.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// 파싱된 목록 요청 의도.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// 필터 조건 (필드명 순으로 정렬되어 결정적)
    pub filters: Vec<Filter>,
    /// 반환 필드 제한 (id는 항상 포함)
    pub select: Option<Vec<String>>,
    /// 정렬 키 순서 목록
    pub sort: Vec<SortKey>,
    /// 페이지 번호 (>= 1)
    pub page: i64,
    /// 페이지 크기
    pub limit: i64,
}

impl QueryDescriptor {
    /// URL 파라미터에서 디스크립터 구성.
    ///
    /// 동일한 파라미터는 항상 동일한 디스크립터를 생성합니다 (멱등).
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let select = params.get("select").map(|s| split_csv(s));

        // 정렬 키가 하나도 안 나오면 (예: `sort=,`) 기본 정렬로
        let sort = {
            let parsed = params
                .get("sort")
                .map(|s| parse_sort(s))
                .unwrap_or_default();
            if parsed.is_empty() {
                parse_sort(DEFAULT_SORT)
            } else {
                parsed
            }
        };

        // page/limit: 없거나 숫자가 아니면 기본값, 상한으로 클램핑
        let page = params
            .get("page")
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE)
            .min(MAX_PAGE);
        let limit = params
            .get("limit")
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let mut filters = Vec::new();
        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            filters.push(parse_filter(key, value)?);
        }

        // HashMap 순회 순서에 무관하게 결정적으로
        filters.sort_by(|a, b| a.field.cmp(&b.field));

        Ok(Self {
            filters,
            select,
            sort,
            page,
            limit,
        })
    }

    /// 건너뛸 행 수. 항상 `(page - 1) * limit`.
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// `field` 또는 `field[op]` 키를 필터로 파싱.
fn parse_filter(key: &str, value: &str) -> Result<Filter, ApiError> {
    match key.split_once('[') {
        Some((field, rest)) => {
            let token = rest.strip_suffix(']').ok_or_else(|| {
                ApiError::Validation(format!("잘못된 필터 키 형식입니다: {}", key))
            })?;
            let op = FilterOp::from_token(token).ok_or_else(|| {
                ApiError::Validation(format!("지원하지 않는 필터 연산자입니다: {}", token))
            })?;
            if field.is_empty() {
                return Err(ApiError::Validation(format!(
                    "잘못된 필터 키 형식입니다: {}",
                    key
                )));
            }
            Ok(Filter {
                field: field.to_string(),
                op,
                value: value.to_string(),
            })
        }
        None => Ok(Filter {
            field: key.to_string(),
            op: FilterOp::Eq,
            value: value.to_string(),
        }),
    }
}

fn parse_sort(spec: &str) -> Vec<SortKey> {
    split_csv(spec)
        .into_iter()
        .map(|field| match field.strip_prefix('-') {
            Some(rest) => SortKey {
                field: rest.to_string(),
                descending: true,
            },
            None => SortKey {
                field,
                descending: false,
            },
        })
        .collect()
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
