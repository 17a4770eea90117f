//! 인증 및 권한 관리.
//!
//! - [`jwt`]: 토큰 생성/검증 (Token Codec)
//! - [`password`]: Argon2 해싱 및 재설정 토큰 (Password Hasher)
//! - [`middleware`]: Bearer 토큰 추출기 (Authentication Gate) 및 역할 검사 (Authorization Gate)
//! - [`roles`]: 역할 정의 및 소유권 판정

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use jwt::{create_token, decode_token, Claims, JwtError};
pub use middleware::{require_role, AuthUser};
pub use password::{
    generate_reset_token, hash_password, hash_reset_token, verify_password, PasswordError,
};
pub use roles::{can_mutate, Role};
