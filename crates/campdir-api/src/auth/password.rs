//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱/검증과
//! 비밀번호 재설정 토큰 생성을 제공합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 솔트는 자동으로 생성되고, 비용 계수는 설정에서 받습니다.
///
/// # Arguments
///
/// * `password` - 해싱할 평문 비밀번호
/// * `m_cost` - 메모리 비용 (KiB)
/// * `t_cost` - 반복 횟수
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str, m_cost: u32, t_cost: u32) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(m_cost, t_cost, 1, None).map_err(|_| PasswordError::HashingFailed)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 해시와 입력된 비밀번호를 알고리즘 자체의
/// 상수 시간 비교로 대조합니다. 해시 문자열을 직접 비교하지 않습니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 재설정 토큰 생성.
///
/// 무작위 20바이트를 hex로 인코딩한 값을 사용자에게 전달하고,
/// 서버에는 그 SHA-256 해시만 저장합니다.
///
/// # Returns
///
/// `(raw, hashed)` - 사용자에게 전달할 원본과 저장용 해시
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    let hashed = hash_reset_token(&raw);
    (raw, hashed)
}

/// 재설정 토큰 후보를 저장 형식(SHA-256 hex)으로 해싱.
pub fn hash_reset_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 테스트에서는 빠른 파라미터 사용
    const TEST_M_COST: u32 = 64;
    const TEST_T_COST: u32 = 1;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "TestPassword123!";
        let hash = hash_password(password, TEST_M_COST, TEST_T_COST).unwrap();

        // 해시 형식 확인 (argon2id)
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password(password, &hash).is_ok());
        assert!(verify_password("WrongPassword123!", &hash).is_err());
    }

    #[test]
    fn test_different_passwords_different_hashes() {
        let hash1 = hash_password("Password1", TEST_M_COST, TEST_T_COST).unwrap();
        let hash2 = hash_password("Password1", TEST_M_COST, TEST_T_COST).unwrap();

        // 같은 비밀번호라도 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);

        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_reset_token_roundtrip() {
        let (raw, hashed) = generate_reset_token();

        // raw는 20바이트 hex = 40자
        assert_eq!(raw.len(), 40);
        // 저장 해시는 SHA-256 hex = 64자
        assert_eq!(hashed.len(), 64);

        // 후보 해싱이 저장 해시와 일치
        assert_eq!(hash_reset_token(&raw), hashed);
        assert_ne!(hash_reset_token("다른 값"), hashed);
    }

    #[test]
    fn test_reset_tokens_are_unique() {
        let (raw1, _) = generate_reset_token();
        let (raw2, _) = generate_reset_token();
        assert_ne!(raw1, raw2);
    }
}
