//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 리소스 쓰기 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # 패닉
///
/// 레코더가 이미 설치되어 있으면 패닉합니다.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .expect("히스토그램 버킷 설정 실패")
        .install_recorder()
        .expect("Prometheus 레코더 설치 실패")
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 리소스 메트릭 헬퍼 함수
// ============================================================================

/// 리소스 쓰기 카운터 증가 (생성/수정/삭제).
pub fn record_document_write(collection: &str, action: &str) {
    counter!(
        "documents_written_total",
        "collection" => collection.to_string(),
        "action" => action.to_string()
    )
    .increment(1);
}

/// 인증 이벤트 카운터 증가 (register/login/logout 등).
pub fn record_auth_event(event: &str, outcome: &str) {
    counter!(
        "auth_events_total",
        "event" => event.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// UUID, 숫자, 비밀번호 재설정 토큰(40자리 hex) 세그먼트를 치환해
/// 메트릭 레이블 카디널리티를 제한합니다.
///
/// 예: `/api/v1/bootcamps/123e4567-e89b-12d3-a456-426614174000` → `/api/v1/bootcamps/:id`
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let normalized: Vec<String> = segments
        .iter()
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            // 재설정 토큰: 40자리 hex
            let is_token = segment.len() == 40 && segment.chars().all(|c| c.is_ascii_hexdigit());

            if is_uuid || is_numeric {
                ":id".to_string()
            } else if is_token {
                ":token".to_string()
            } else {
                (*segment).to_string()
            }
        })
        .collect();
    normalized.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/bootcamps/123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(normalize_path(path), "/api/v1/bootcamps/:id");
    }

    #[test]
    fn test_normalize_path_nested() {
        let path = "/api/v1/bootcamps/123e4567-e89b-12d3-a456-426614174000/courses";
        assert_eq!(normalize_path(path), "/api/v1/bootcamps/:id/courses");
    }

    #[test]
    fn test_normalize_path_reset_token() {
        let path = "/api/v1/auth/resetpassword/0123456789abcdef0123456789abcdef01234567";
        assert_eq!(normalize_path(path), "/api/v1/auth/resetpassword/:token");
    }

    #[test]
    fn test_normalize_path_no_params() {
        let path = "/api/v1/bootcamps";
        assert_eq!(normalize_path(path), "/api/v1/bootcamps");
    }
}
