use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Failure taxonomy for extraction operations.
///
/// Every public operation returns `ExtractResult`; no parsing or decoding
/// failure is allowed to panic past the library boundary. A missing id or
/// title on a single listing card is handled inside the list extractor (the
/// card is dropped), so `MissingField` only surfaces for detail and chapter
/// records where the field is mandatory.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("unexpected document structure: {0}")]
    StructuralMismatch(String),

    #[error("decode failure: {0}")]
    DecodeFailure(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::MalformedPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = ExtractError::MissingField { field: "manga_id" };
        assert_eq!(err.to_string(), "missing required field: manga_id");

        let err = ExtractError::StructuralMismatch("no chapter list container".into());
        assert!(err.to_string().contains("no chapter list container"));
    }

    #[test]
    fn test_json_error_converts_to_malformed_payload() {
        let json_err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: ExtractError = json_err.into();
        assert!(matches!(err, ExtractError::MalformedPayload(_)));
    }
}
