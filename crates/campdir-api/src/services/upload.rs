//! 파일 업로드 저장.
//!
//! 크기/유형을 검증한 뒤 로컬 디렉토리에 기록합니다.
//! 파일 이동은 대기되는 비동기 작업으로 처리합니다 (콜백 아님).

use std::path::Path;

use crate::error::ApiError;

/// 허용되는 이미지 MIME 타입에 대응하는 확장자 반환.
///
/// 이미지가 아니면 `Validation` 에러.
pub fn image_extension(content_type: &str) -> Result<&'static str, ApiError> {
    match content_type {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        _ => Err(ApiError::Validation(
            "이미지 파일만 업로드할 수 있습니다".to_string(),
        )),
    }
}

/// 업로드 크기 검증.
pub fn check_size(len: usize, max_size_bytes: usize) -> Result<(), ApiError> {
    if len == 0 {
        return Err(ApiError::Validation("업로드할 파일이 없습니다".to_string()));
    }
    if len > max_size_bytes {
        return Err(ApiError::Validation(format!(
            "파일 크기는 {}바이트 이하여야 합니다",
            max_size_bytes
        )));
    }
    Ok(())
}

/// 업로드 디렉토리에 파일 기록.
pub async fn save_file(dir: &str, filename: &str, bytes: &[u8]) -> Result<(), ApiError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Upstream(format!("업로드 디렉토리 생성 실패: {}", e)))?;

    let path = Path::new(dir).join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Upstream(format!("파일 저장 실패: {}", e)))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "업로드 파일 저장됨");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_known_types() {
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpg");
        assert_eq!(image_extension("image/png").unwrap(), "png");
        assert!(image_extension("application/pdf").is_err());
        assert!(image_extension("text/plain").is_err());
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(100, 1000).is_ok());
        assert!(check_size(1000, 1000).is_ok());
        assert!(check_size(1001, 1000).is_err());
        assert!(check_size(0, 1000).is_err());
    }

    #[tokio::test]
    async fn test_save_file_writes_bytes() {
        let dir = std::env::temp_dir().join("campdir-upload-test");
        let dir_str = dir.to_str().unwrap();

        save_file(dir_str, "photo_test.jpg", b"fake-image-bytes")
            .await
            .unwrap();

        let written = tokio::fs::read(dir.join("photo_test.jpg")).await.unwrap();
        assert_eq!(written, b"fake-image-bytes");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
