//! 부트캠프 디렉토리 API의 공유 코어.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 애플리케이션 설정 ([`config`])
//! - 공통 에러 타입 ([`error`])
//! - tracing 기반 로깅 초기화 ([`logging`])

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, GeocoderConfig, LoggingConfig, ServerConfig,
    UploadConfig,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
