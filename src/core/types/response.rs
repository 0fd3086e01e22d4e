//! Raw wire responses and decoded response instances.

use crate::core::protocol::constants::headers;
use crate::core::types::field::FieldValue;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// HTTP response exactly as the transport received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl WireResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        WireResponse {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(headers::OPC_REQUEST_ID)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header(headers::ETAG)
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Default for WireResponse {
    fn default() -> Self {
        WireResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }
}

/// A response decoded against its operation's declaration.
///
/// Built once, all-or-nothing, by [`crate::protocol::parse`]. The raw response
/// stays available for callers that need the status, undeclared headers or
/// the raw body.
#[derive(Clone, Debug)]
pub struct ParsedResponse<B> {
    raw: WireResponse,
    header_fields: BTreeMap<&'static str, FieldValue>,
    body: Option<B>,
}

impl<B> ParsedResponse<B> {
    pub(crate) fn new(
        raw: WireResponse,
        header_fields: BTreeMap<&'static str, FieldValue>,
        body: Option<B>,
    ) -> Self {
        Self {
            raw,
            header_fields,
            body,
        }
    }

    pub fn raw(&self) -> &WireResponse {
        &self.raw
    }

    pub fn into_raw(self) -> WireResponse {
        self.raw
    }

    #[inline]
    pub fn status(&self) -> u16 {
        self.raw.status
    }

    /// Decoded declared header fields. Absent headers are not listed.
    pub fn header_fields(&self) -> &BTreeMap<&'static str, FieldValue> {
        &self.header_fields
    }

    pub fn header_field(&self, name: &str) -> Option<&FieldValue> {
        self.header_fields.get(name)
    }

    /// Declared header field as text.
    pub fn header_str(&self, name: &str) -> Option<String> {
        self.header_field(name).and_then(FieldValue::to_text)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.raw.request_id()
    }

    pub fn etag(&self) -> Option<&str> {
        self.raw.etag()
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Split into raw response, header fields and body.
    pub fn into_parts(self) -> (WireResponse, BTreeMap<&'static str, FieldValue>, Option<B>) {
        (self.raw, self.header_fields, self.body)
    }
}

/// A typed response built from a parsed wire response.
pub trait OperationResponse: Sized {
    type Body: DeserializeOwned;

    fn from_parsed(parsed: ParsedResponse<Self::Body>) -> Self;
}

impl<B: DeserializeOwned> OperationResponse for ParsedResponse<B> {
    type Body = B;

    fn from_parsed(parsed: ParsedResponse<B>) -> Self {
        parsed
    }
}
