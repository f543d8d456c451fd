//! Encode/decode strategies applied to serialized envelopes.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use authstash_core::config::CodecKind;
use authstash_core::error::{AppError, ErrorKind};
use authstash_core::result::AppResult;

/// Transform applied between the serialized envelope and the adapter.
pub trait ValueCodec: Send + Sync + std::fmt::Debug + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Encode a serialized envelope for storage.
    fn encode(&self, plain: &str) -> AppResult<String>;

    /// Decode a stored payload back into a serialized envelope.
    fn decode(&self, stored: &str) -> AppResult<String>;
}

/// Stores envelopes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl ValueCodec for IdentityCodec {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn encode(&self, plain: &str) -> AppResult<String> {
        Ok(plain.to_string())
    }

    fn decode(&self, stored: &str) -> AppResult<String> {
        Ok(stored.to_string())
    }
}

/// Stores envelopes as standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl ValueCodec for Base64Codec {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, plain: &str) -> AppResult<String> {
        Ok(BASE64.encode(plain.as_bytes()))
    }

    fn decode(&self, stored: &str) -> AppResult<String> {
        let bytes = BASE64
            .decode(stored)
            .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Invalid base64 payload", e))?;
        String::from_utf8(bytes).map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Decoded payload is not UTF-8", e)
        })
    }
}

/// Codec for a configured kind.
pub fn codec_for(kind: CodecKind) -> Arc<dyn ValueCodec> {
    match kind {
        CodecKind::Identity => Arc::new(IdentityCodec),
        CodecKind::Base64 => Arc::new(Base64Codec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encodes() {
        let codec = Base64Codec;
        let encoded = codec.encode(r#"{"value":1}"#).unwrap();
        assert_eq!(encoded, "eyJ2YWx1ZSI6MX0=");
        assert_eq!(codec.decode(&encoded).unwrap(), r#"{"value":1}"#);
    }

    #[test]
    fn test_base64_rejects_garbage() {
        let err = Base64Codec.decode("not base64!").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_codec_for() {
        assert_eq!(codec_for(CodecKind::Identity).name(), "identity");
        assert_eq!(codec_for(CodecKind::Base64).name(), "base64");
    }
}
