/// Payload transform used in "encrypted" storage mode
///
/// The default codec is identity-through-JSON; real encryption can be
/// plugged in by implementing [`PayloadCodec`].
use serde_json::Value;

use crate::error::CodecError;

pub trait PayloadCodec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, CodecError>;
    fn decode(&self, payload: &str) -> Result<Value, CodecError>;
}

/// Identity transform: values are stored as plain JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Encode)
    }

    fn decode(&self, payload: &str) -> Result<Value, CodecError> {
        serde_json::from_str(payload).map_err(CodecError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strings_are_quoted() {
        // Unlike plain mode, encoded strings keep their JSON quotes
        assert_eq!(JsonCodec.encode(&json!("intro")).unwrap(), "\"intro\"");
    }

    #[test]
    fn test_decode_rejects_bare_words() {
        assert!(matches!(
            JsonCodec.decode("intro"),
            Err(CodecError::Decode(_))
        ));
    }
}
