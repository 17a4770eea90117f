//! 메일 발송 collaborator.
//!
//! 실제 전달 메커니즘은 이 코어의 범위 밖입니다.
//! 트레이트 뒤로 분리하여 재설정 메일 발송 실패 시
//! 롤백 경로를 테스트할 수 있게 합니다.

use async_trait::async_trait;
use campdir_core::{CoreError, CoreResult};

/// 발송할 메일.
#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 메일 발송기.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// 메일 발송. 실패 시 `CoreError::External`.
    async fn send(&self, mail: Mail) -> CoreResult<()>;
}

/// tracing으로 메일 내용을 기록하는 기본 구현.
///
/// 개발/테스트 환경용. 항상 성공합니다.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> CoreResult<()> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            "메일 발송 (로그 전용)"
        );
        tracing::debug!(body = %mail.body, "메일 본문");
        Ok(())
    }
}

/// 항상 실패하는 발송기 (테스트용).
#[cfg(any(test, feature = "test-utils"))]
pub struct FailingMailer;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: Mail) -> CoreResult<()> {
        Err(CoreError::External("메일 발송 실패".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        let mailer = LogMailer;
        let result = mailer
            .send(Mail {
                to: "user@example.com".to_string(),
                subject: "비밀번호 재설정".to_string(),
                body: "재설정 링크".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failing_mailer_fails() {
        let mailer = FailingMailer;
        let result = mailer
            .send(Mail {
                to: "user@example.com".to_string(),
                subject: "제목".to_string(),
                body: "본문".to_string(),
            })
            .await;
        assert!(matches!(result, Err(CoreError::External(_))));
    }
}
