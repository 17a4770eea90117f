//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 정의 및 소유권 판정.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 사용자 역할.
///
/// 시스템에서 사용자의 권한 수준을 정의합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 - 리뷰 작성 가능
    User,
    /// 퍼블리셔 - 부트캠프/코스 게시 가능
    Publisher,
    /// 관리자 - 모든 권한 보유
    Admin,
}

impl Role {
    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "publisher" => Some(Role::Publisher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 소유권 판정.
///
/// 관리자이거나 리소스 소유자인 경우에만 수정/삭제를 허용합니다.
pub fn can_mutate(role: Role, user_id: Uuid, owner_id: Uuid) -> bool {
    role == Role::Admin || user_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("PUBLISHER"), Some(Role::Publisher));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("viewer"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Publisher).unwrap();
        assert_eq!(json, "\"publisher\"");

        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::Publisher);
    }

    #[test]
    fn test_can_mutate_owner() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(can_mutate(Role::Publisher, owner, owner));
        assert!(!can_mutate(Role::Publisher, other, owner));
        assert!(!can_mutate(Role::User, other, owner));
    }

    #[test]
    fn test_can_mutate_admin_overrides() {
        let owner = Uuid::new_v4();
        let admin = Uuid::new_v4();

        assert!(can_mutate(Role::Admin, admin, owner));
    }
}
