use serde_json::Value;
use thiserror::Error;

/// Malformed input, with the JSON path where decoding stopped.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {source}")]
pub struct DecodeError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_path_to_error::Error<serde_json::Error>> for DecodeError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        Self { path, source: err.into_inner() }
    }
}

/// Decode a document, keeping key order and the original numeric literals.
pub fn from_slice_with_path(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize::<_, Value>(&mut de)?;
    de.end().map_err(|source| DecodeError { path: ".".to_string(), source })?;
    Ok(value)
}

pub fn from_str_with_path(src: &str) -> Result<Value, DecodeError> {
    from_slice_with_path(src.as_bytes())
}
