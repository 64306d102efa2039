//! Upload payload ingestion
//!
//! Accepts the shapes the commit detail source hands over:
//! - a bare JSON array of uploads
//! - `{ "uploads": [...] }`
//! - `{ "commit": { "uploads": [...] } }`, optionally wrapped in `{ "data": ... }`

use crate::error::{ModelError, ModelResult};
use crate::upload::Upload;
use serde_json::Value;

/// Parse uploads from a JSON payload
///
/// # Errors
/// - `ModelError::InvalidPayload` if the text is not JSON or an upload is malformed
/// - `ModelError::MissingUploads` if no uploads list can be located
pub fn parse_uploads(json: &str) -> ModelResult<Vec<Upload>> {
    let value: Value = serde_json::from_str(json)?;
    uploads_from_value(value)
}

/// Extract uploads from an already-parsed JSON value
///
/// A `null` uploads list is treated as empty.
///
/// # Errors
/// Same as [`parse_uploads`].
pub fn uploads_from_value(value: Value) -> ModelResult<Vec<Upload>> {
    let list = locate_uploads(value)?;
    Ok(serde_json::from_value::<Option<Vec<Upload>>>(list)?.unwrap_or_default())
}

fn locate_uploads(value: Value) -> ModelResult<Value> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(mut map) => {
            if let Some(uploads) = map.remove("uploads") {
                return Ok(uploads);
            }
            if let Some(commit) = map.remove("commit") {
                return locate_uploads(commit);
            }
            if let Some(data) = map.remove("data") {
                return locate_uploads(data);
            }
            Err(ModelError::missing_uploads("object has no uploads, commit or data key"))
        }
        Value::Null => Err(ModelError::missing_uploads("payload is null")),
        other => Err(ModelError::missing_uploads(format!("unexpected payload: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadId;

    #[test]
    fn bare_array() {
        let uploads = parse_uploads(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[1].id, Some(UploadId(2)));
    }

    #[test]
    fn commit_payload() {
        let uploads =
            parse_uploads(r#"{"data": {"commit": {"uploads": [{"id": 3, "provider": "travis"}]}}}"#)
                .unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].provider.as_deref(), Some("travis"));
    }

    #[test]
    fn null_uploads_is_empty() {
        let uploads = parse_uploads(r#"{"commit": {"uploads": null}}"#).unwrap();
        assert!(uploads.is_empty());
    }

    #[test]
    fn missing_uploads_key() {
        let err = parse_uploads(r#"{"commit": {"sha": "abc"}}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingUploads(_)));
    }

    #[test]
    fn malformed_json() {
        let err = parse_uploads("[").unwrap_err();
        assert!(matches!(err, ModelError::InvalidPayload(_)));
    }
}
