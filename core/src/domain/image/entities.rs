use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use crate::domain::common::entities::app_errors::CoreError;

/// Photo bytes as supplied by the user, before any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Bytes,
    /// Declared MIME type. Only a hint: the decoder sniffs the real format.
    pub mime_type: String,
}

impl RawImage {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Builds a `RawImage` whose MIME type is guessed from the magic bytes.
    pub fn sniffed(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");

        Self::new(bytes, mime_type)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Re-encoded image in data-URL form (`data:<mime>;base64,<payload>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data_url: String,
    payload_offset: usize,
    width: u32,
    height: u32,
    original_bytes: usize,
    encoded_bytes: usize,
}

impl EncodedImage {
    pub fn new(
        mime_type: &str,
        encoded: &[u8],
        width: u32,
        height: u32,
        original_bytes: usize,
    ) -> Self {
        let prefix = format!("data:{mime_type};base64,");
        let payload_offset = prefix.len();
        let mut data_url = prefix;
        general_purpose::STANDARD.encode_string(encoded, &mut data_url);

        Self {
            data_url,
            payload_offset,
            width,
            height,
            original_bytes,
            encoded_bytes: encoded.len(),
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }

    pub fn mime_type(&self) -> &str {
        self.data_url["data:".len()..self.payload_offset]
            .trim_end_matches(";base64,")
    }

    /// Bare base64 payload, without the `data:` prefix.
    pub fn base64_payload(&self) -> &str {
        &self.data_url[self.payload_offset..]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn original_bytes(&self) -> usize {
        self.original_bytes
    }

    pub fn encoded_bytes(&self) -> usize {
        self.encoded_bytes
    }

    pub fn decode_payload(&self) -> Result<Vec<u8>, CoreError> {
        general_purpose::STANDARD
            .decode(self.base64_payload())
            .map_err(|e| CoreError::ImageDecode(format!("invalid base64 payload: {e}")))
    }
}
