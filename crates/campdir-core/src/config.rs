//! 설정 관리.
//!
//! 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 프로세스 시작 시 한 번 로드되어 불변 구조체로 각 컴포넌트에 전달됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 파일 업로드 설정
    #[serde(default)]
    pub uploads: UploadConfig,
    /// 지오코딩 설정
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 분당 요청 한도 (0이면 비활성화)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            rate_limit_per_minute: default_rate_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_rate_limit() -> u32 {
    600
}
fn default_request_timeout() -> u64 {
    30
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 인증 설정.
///
/// JWT 서명 키, 토큰 수명, 쿠키 만료, 비밀번호 해싱 비용을 포함합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키
    pub jwt_secret: String,
    /// 액세스 토큰 수명 (분)
    pub token_ttl_minutes: i64,
    /// 토큰 쿠키 만료 (일)
    pub cookie_expire_days: i64,
    /// 비밀번호 재설정 토큰 수명 (분)
    pub reset_token_ttl_minutes: i64,
    /// Argon2 메모리 비용 (KiB)
    #[serde(default = "default_argon2_m_cost")]
    pub argon2_m_cost: u32,
    /// Argon2 반복 횟수
    #[serde(default = "default_argon2_t_cost")]
    pub argon2_t_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-key-change-in-production".to_string(),
            token_ttl_minutes: 60 * 24 * 30,
            cookie_expire_days: 30,
            reset_token_ttl_minutes: 10,
            argon2_m_cost: default_argon2_m_cost(),
            argon2_t_cost: default_argon2_t_cost(),
        }
    }
}

fn default_argon2_m_cost() -> u32 {
    19456
}
fn default_argon2_t_cost() -> u32 {
    2
}

/// 파일 업로드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// 업로드 파일 저장 디렉토리
    pub dir: String,
    /// 최대 파일 크기 (바이트)
    pub max_size_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "./public/uploads".to_string(),
            max_size_bytes: 1_000_000,
        }
    }
}

/// 지오코딩 설정.
///
/// base_url이 비어 있으면 지오코딩이 비활성화되고
/// 반경 검색 엔드포인트는 `Upstream` 에러를 반환합니다.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeocoderConfig {
    /// 지오코딩 서비스 기본 URL (예: Nominatim 호환 엔드포인트)
    #[serde(default)]
    pub base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
}

fn default_geocoder_timeout() -> u64 {
    5
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `CAMPDIR` 프리픽스와 `__` 구분자를 사용합니다.
    /// 예: `CAMPDIR__AUTH__JWT_SECRET`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("CAMPDIR")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
