//! 지오코딩 collaborator.
//!
//! 주소/우편번호를 위경도로 변환합니다.
//! Nominatim 호환 검색 엔드포인트를 사용하는 reqwest 기반 구현을 제공합니다.

use async_trait::async_trait;
use campdir_core::{CoreError, CoreResult, GeocoderConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 지오코딩 결과 좌표.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// 지오코딩 서비스.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 주소 또는 우편번호를 좌표로 변환.
    ///
    /// 결과가 없으면 `CoreError::NotFound`, 요청 실패는 `CoreError::External`.
    async fn geocode(&self, query: &str) -> CoreResult<GeoPoint>;
}

/// Nominatim 호환 응답 항목.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// HTTP 지오코더.
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeocoder {
    /// 설정에서 생성. base_url이 비어 있으면 None (지오코딩 비활성화).
    pub fn from_config(config: &GeocoderConfig) -> Option<Self> {
        if config.base_url.is_empty() {
            return None;
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("campdir-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .ok()?;

        Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> CoreResult<GeoPoint> {
        let url = format!("{}/search", self.base_url);

        let results: Vec<SearchResult> = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| CoreError::External(format!("지오코딩 요청 실패: {}", e)))?
            .error_for_status()
            .map_err(|e| CoreError::External(format!("지오코딩 응답 에러: {}", e)))?
            .json()
            .await
            .map_err(|e| CoreError::External(format!("지오코딩 응답 파싱 실패: {}", e)))?;

        let first = results
            .first()
            .ok_or_else(|| CoreError::NotFound(format!("주소를 찾을 수 없습니다: {}", query)))?;

        let latitude = first
            .lat
            .parse()
            .map_err(|_| CoreError::External("지오코딩 좌표 형식 오류".to_string()))?;
        let longitude = first
            .lon
            .parse()
            .map_err(|_| CoreError::External("지오코딩 좌표 형식 오류".to_string()))?;

        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_when_base_url_empty() {
        let config = GeocoderConfig {
            base_url: String::new(),
            timeout_secs: 5,
        };
        assert!(HttpGeocoder::from_config(&config).is_none());
    }

    #[test]
    fn test_enabled_with_base_url() {
        let config = GeocoderConfig {
            base_url: "https://nominatim.example.com/".to_string(),
            timeout_secs: 5,
        };
        let geocoder = HttpGeocoder::from_config(&config).unwrap();
        // 후행 슬래시 제거 확인
        assert_eq!(geocoder.base_url, "https://nominatim.example.com");
    }

    #[test]
    fn test_geo_point_serde() {
        let point = GeoPoint {
            latitude: 42.3601,
            longitude: -71.0589,
        };
        let json = serde_json::to_string(&point).unwrap();
        let parsed: GeoPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, point);
    }
}
