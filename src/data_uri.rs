//! Data URI encoding and decoding.
//!
//! Snapshots travel as `data:<mime>;base64,<payload>` strings for display and
//! are turned back into raw bytes before upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// URI scheme prefix.
const SCHEME: &str = "data:";

/// Encoding marker required before the comma.
const BASE64_MARKER: &str = "base64";

/// Media type assumed when the URI omits one (RFC 2397).
pub const DEFAULT_MIME: &str = "text/plain;charset=US-ASCII";

/// Binary payload of a data URI together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedData {
    /// Media type without parameters, e.g. `image/jpeg`
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Errors raised for malformed data URIs.
#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("data URI must start with 'data:'")]
    MissingScheme,

    #[error("data URI has no ',' separating header and payload")]
    MissingComma,

    #[error("data URI payload is not base64-encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Build a base64 data URI for `bytes` tagged with `mime`.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("{SCHEME}{mime};{BASE64_MARKER},{}", STANDARD.encode(bytes))
}

/// Decode a base64 data URI into its media type and bytes.
///
/// # Errors
///
/// Returns `DataUriError::MissingScheme` or `DataUriError::MissingComma` for
/// structurally broken input, `DataUriError::NotBase64` for percent-encoded
/// URIs, and `DataUriError::InvalidBase64` when the payload does not decode.
pub fn decode(uri: &str) -> Result<DecodedData, DataUriError> {
    let (header, payload) = split(uri)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    if !params.any(|p| p.trim().eq_ignore_ascii_case(BASE64_MARKER)) {
        return Err(DataUriError::NotBase64);
    }

    let bytes = STANDARD.decode(payload.trim())?;

    Ok(DecodedData {
        mime: if mime.is_empty() {
            DEFAULT_MIME.to_string()
        } else {
            mime.to_string()
        },
        bytes,
    })
}

/// Return the raw base64 payload of a data URI without decoding it.
pub fn payload(uri: &str) -> Result<&str, DataUriError> {
    split(uri).map(|(_, payload)| payload)
}

fn split(uri: &str) -> Result<(&str, &str), DataUriError> {
    let rest = uri
        .get(..SCHEME.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(SCHEME))
        .map(|_| &uri[SCHEME.len()..])
        .ok_or(DataUriError::MissingScheme)?;

    rest.split_once(',').ok_or(DataUriError::MissingComma)
}
