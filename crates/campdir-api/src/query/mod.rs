//! 쿼리 변환기.
//!
//! URL 파라미터 → [`QueryDescriptor`] → SQL 실행 계획의 두 단계로
//! 목록 엔드포인트의 filter/sort/select/pagination을 처리합니다.

pub mod descriptor;
pub mod plan;

pub use descriptor::{Filter, FilterOp, QueryDescriptor, SortKey, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use plan::{run_list_query, Collection, ListResult, Populate};
