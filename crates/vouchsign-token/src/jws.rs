//! Compact JWS serialization (`header.payload.signature`).

use crate::error::TokenError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vouchsign_core::Algorithm;

/// JOSE header of a voucher token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Algorithm name as written by the issuer. Kept as a string so foreign
    /// or hostile values can still be inspected.
    pub alg: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key identifier hint for the verifier's key registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Header {
    pub fn new(algorithm: Algorithm, kid: Option<String>) -> Self {
        Self {
            alg: algorithm.as_str().to_string(),
            typ: Some("JWT".to_string()),
            kid,
        }
    }
}

/// Borrowed view of the three segments of a compact token.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompactParts<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
    /// `header.payload`, the bytes covered by the signature.
    pub signing_input: &'a str,
}

/// Split a token into exactly three non-empty segments.
pub(crate) fn split_compact(token: &str) -> Option<CompactParts<'_>> {
    let mut segments = token.split('.');
    let header = segments.next()?;
    let payload = segments.next()?;
    let signature = segments.next()?;
    if segments.next().is_some() || header.is_empty() || payload.is_empty() || signature.is_empty()
    {
        return None;
    }

    Some(CompactParts {
        header,
        payload,
        signature,
        signing_input: &token[..header.len() + 1 + payload.len()],
    })
}

pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment).ok()
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    Ok(encode_segment(&serde_json::to_vec(value)?))
}

pub(crate) fn decode_json<T: DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = decode_segment(segment)?;
    serde_json::from_slice(&bytes).ok()
}
