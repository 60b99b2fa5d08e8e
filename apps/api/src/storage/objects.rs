use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

/// `tenders/<tender_id>/<filename>`, with the filename reduced to a safe basename.
pub fn tender_object_key(tender_id: &str, filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('.');
    let name = if safe.is_empty() { "document" } else { safe };
    format!("tenders/{tender_id}/{name}")
}

/// Archives the raw upload so the parsed artifacts can always be traced back
/// to the exact bytes they came from.
pub async fn archive_upload(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload failed: {e}")))?;

    info!("Archived upload to s3://{bucket}/{key}");
    Ok(())
}
