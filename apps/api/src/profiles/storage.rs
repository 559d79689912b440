//! S3-backed storage for candidate resume and profile-image files.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;

pub const RESUME_PREFIX: &str = "resumes";
pub const PROFILE_IMAGE_PREFIX: &str = "profile-images";

/// Builds a collision-free object key, keeping a sanitized version of the
/// original filename for readability.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}-{}", prefix, Uuid::new_v4(), safe)
}

pub fn public_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

pub async fn upload(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;
    tracing::info!("Uploaded s3://{}/{}", bucket, key);
    Ok(())
}

/// Best-effort delete; a missing object is not an error.
pub async fn delete(s3: &S3Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("delete of {key} failed: {e}")))?;
    tracing::info!("Deleted s3://{}/{}", bucket, key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_sanitizes_filename() {
        let key = object_key(RESUME_PREFIX, "my resume (final).pdf");
        assert!(key.starts_with("resumes/"));
        assert!(key.ends_with("my_resume__final_.pdf"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_object_keys_are_unique() {
        let a = object_key(RESUME_PREFIX, "resume.pdf");
        let b = object_key(RESUME_PREFIX, "resume.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_url_shape() {
        let url = public_url("http://localhost:9000/", "shepherd", "resumes/abc.pdf");
        assert_eq!(url, "http://localhost:9000/shepherd/resumes/abc.pdf");
    }
}
