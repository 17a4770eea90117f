//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 모든 Repository는 static methods 패턴을 사용합니다.

pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

pub use bootcamps::{BootcampRecord, BootcampRepository, EARTH_RADIUS_MILES};
pub use courses::{CourseRecord, CourseRepository};
pub use reviews::{ReviewRecord, ReviewRepository};
pub use users::{NewUser, UpdateUser, UserRecord, UserRepository};

#[cfg(test)]
mod tests {
    const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

    // 삭제는 단건 문서 제거이고 하위 문서는 고아로 남습니다.
    // 부모 참조에 FK가 있으면 하위 문서가 남은 부모의 삭제가
    // 23503으로 막히므로, 스키마에 FK 제약이 없어야 합니다.
    #[test]
    fn test_schema_has_no_parent_fk_constraints() {
        assert!(!INIT_SQL.contains("REFERENCES"));
    }

    #[test]
    fn test_schema_keeps_one_review_per_user_constraint() {
        assert!(INIT_SQL.contains("CONSTRAINT unique_review_per_user UNIQUE (bootcamp_id, user_id)"));
    }
}
