//! 외부 collaborator 서비스.
//!
//! 메일 발송, 지오코딩, 파일 저장을 트레이트/헬퍼로 분리합니다.

pub mod geocoder;
pub mod mailer;
pub mod upload;

pub use geocoder::{GeoPoint, Geocoder, HttpGeocoder};
pub use mailer::{LogMailer, Mail, Mailer};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::FailingMailer;
