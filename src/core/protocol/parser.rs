//! Response parser: wire response → declared fields.

use crate::core::error::{ControlPlaneError, ParseError, Result, ServiceError};
use crate::core::protocol::constants::{headers, media_types};
use crate::core::protocol::precondition::is_precondition_failed;
use crate::core::types::{
    BodyShape, FieldValue, HeaderShape, Operation, ParsedResponse, ResponseHeader, WireResponse,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decode `raw` against the response declaration of `operation`.
///
/// All-or-nothing: either every declared header that is present decodes and
/// the body (if declared) matches `B`, or a [`ParseError`] carrying the raw
/// response is returned. Absent declared headers are simply not listed.
pub fn parse<B>(raw: WireResponse, operation: &Operation) -> std::result::Result<ParsedResponse<B>, ParseError>
where
    B: DeserializeOwned,
{
    let mut fields = BTreeMap::new();
    for decl in operation.response_headers {
        if let Some(value) = raw.header(decl.name) {
            let decoded = decode_header(decl, value).ok_or_else(|| ParseError::HeaderDecode {
                name: decl.name.to_string(),
                value: value.to_string(),
                raw: Box::new(raw.clone()),
            })?;
            fields.insert(decl.name, decoded);
        }
    }

    let body = match operation.response_body {
        BodyShape::None => None,
        BodyShape::Json => match serde_json::from_slice::<B>(&raw.body) {
            Ok(body) => Some(body),
            Err(e) => {
                return Err(ParseError::BodyDecode {
                    message: e.to_string(),
                    raw: Box::new(raw),
                })
            }
        },
    };

    Ok(ParsedResponse::new(raw, fields, body))
}

fn decode_header(decl: &ResponseHeader, value: &str) -> Option<FieldValue> {
    match decl.shape {
        HeaderShape::Str => Some(FieldValue::Str(value.to_string())),
        HeaderShape::Int => value.trim().parse::<i64>().ok().map(FieldValue::Int),
        HeaderShape::Bool => match value.trim() {
            v if v.eq_ignore_ascii_case("true") => Some(FieldValue::Bool(true)),
            v if v.eq_ignore_ascii_case("false") => Some(FieldValue::Bool(false)),
            _ => None,
        },
    }
}

/// Render declared header fields and a body as a wire response.
///
/// Inverse of [`parse`] for every declared field shape; undeclared fields are
/// dropped. Used to build fixtures and fake services.
pub fn encode_response<B>(
    operation: &Operation,
    status: u16,
    header_fields: &BTreeMap<&'static str, FieldValue>,
    body: Option<&B>,
) -> Result<WireResponse>
where
    B: Serialize + ?Sized,
{
    let mut response = WireResponse::new(status, Bytes::new());
    for decl in operation.response_headers {
        if let Some(text) = header_fields.get(decl.name).and_then(FieldValue::to_text) {
            response.headers.insert(decl.name.to_string(), text);
        }
    }
    if let (BodyShape::Json, Some(body)) = (operation.response_body, body) {
        response.body = serde_json::to_vec(body)?.into();
        response
            .headers
            .insert(headers::CONTENT_TYPE.to_string(), media_types::JSON.to_string());
    }
    Ok(response)
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Classify a non-success response.
///
/// 412 becomes [`ControlPlaneError::PreconditionFailed`]; anything else a
/// [`ControlPlaneError::Service`]. The error code and message are read from a
/// JSON error body when one is present.
pub fn service_error(response: &WireResponse) -> ControlPlaneError {
    let details = serde_json::from_slice::<ErrorBody>(&response.body).ok();
    let (code, message) = details.map_or((None, None), |d| (d.code, d.message));
    let request_id = response.request_id().map(str::to_string);

    if is_precondition_failed(response) {
        return ControlPlaneError::PreconditionFailed {
            request_id,
            message,
        };
    }

    ServiceError {
        status: response.status,
        code,
        message,
        request_id,
        body: response.body.clone(),
    }
    .into()
}
