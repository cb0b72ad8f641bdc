use aws_sdk_s3 as s3;
use aws_sdk_s3::primitives::ByteStream;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub async fn upload_object(
    client: &s3::Client,
    bucket: &str,
    key: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(content_type)
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("S3 upload failed for {}: {:?}", key, e);
            AppError::InternalError("File upload failed".to_string())
        })?;

    Ok(())
}

/// Random object key under `folder`, keeping the original extension so the
/// CDN serves the right content type.
pub fn object_key(folder: &str, filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(char::is_alphanumeric));

    match extension {
        Some(ext) => format!("{}/{}.{}", folder, Uuid::new_v4(), ext.to_lowercase()),
        None => format!("{}/{}", folder, Uuid::new_v4()),
    }
}

/// Public URL for a stored object, served from the assets host rather than
/// the raw bucket endpoint.
pub fn public_url(assets_url: &str, key: &str) -> String {
    format!("{}/{}", assets_url.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key("uploads", "photo.JPG");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_object_key_drops_suspicious_extension() {
        let key = object_key("uploads", "archive.tar.gz../../etc");
        assert!(key.starts_with("uploads/"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = object_key("uploads", "README");
        assert!(key.starts_with("uploads/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_public_url_joins_cleanly() {
        assert_eq!(
            public_url("https://assets.example.com/", "uploads/a.png"),
            "https://assets.example.com/uploads/a.png"
        );
        assert_eq!(
            public_url("https://assets.example.com", "uploads/a.png"),
            "https://assets.example.com/uploads/a.png"
        );
    }
}
