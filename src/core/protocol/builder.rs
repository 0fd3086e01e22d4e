//! Request builder: operation + typed value → wire request.
//!
//! The builder reads fields only through [`FieldSource`] and only the fields
//! the operation declares. Every failure is a [`BuildError`] raised before any
//! network attempt.
//!
//! | Placement | Absent | Explicit empty | Mandatory + missing |
//! |-----------|--------|----------------|---------------------|
//! | Path | error | error | `MissingField` |
//! | Query | omitted | `key=` | `MissingField` |
//! | Header | omitted | empty value | `MissingField` |
//! | Body | omitted | `""` | `MissingField` |

use crate::core::error::BuildError;
use crate::core::protocol::constants::{headers, media_types};
use crate::core::types::{
    CollectionFormat, FieldSource, FieldValue, Operation, Placement, RequestMetadata, WireRequest,
};
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;

/// Render `source` as a wire request for `operation`.
///
/// Deterministic: the same operation, field values and metadata always give
/// the same [`WireRequest`].
///
/// # Examples
///
/// ```
/// use ctlplane::protocol::build;
/// use ctlplane::types::{BodyShape, FieldSpec, FieldValue, Method, Operation, RequestMetadata};
/// use std::collections::BTreeMap;
///
/// static DELETE_POLICY: Operation = Operation {
///     name: "DeletePolicy",
///     method: Method::Delete,
///     path_template: "/policies/{policyId}",
///     fields: &[FieldSpec::path("policyId")],
///     response_headers: &[],
///     response_body: BodyShape::None,
/// };
///
/// let mut fields = BTreeMap::new();
/// fields.insert("policyId", FieldValue::from("p-1"));
/// let wire = build(&DELETE_POLICY, &fields, &RequestMetadata::new()).unwrap();
/// assert_eq!(wire.target(), "/policies/p-1");
/// assert!(wire.body.is_none());
/// ```
pub fn build<S>(
    operation: &Operation,
    source: &S,
    metadata: &RequestMetadata,
) -> Result<WireRequest, BuildError>
where
    S: FieldSource + ?Sized,
{
    for spec in operation.fields {
        if spec.is_mandatory() && source.field(spec.name).is_missing() {
            return Err(BuildError::MissingField(spec.name.to_string()));
        }
    }

    let mut request = WireRequest::new(operation.method, render_path(operation, source)?);

    for spec in operation.fields_in(Placement::Query) {
        match source.field(spec.name) {
            FieldValue::Absent => {}
            FieldValue::List(items) => match spec.collection {
                CollectionFormat::Multi => {
                    for item in items {
                        request.query.push((spec.name.to_string(), item));
                    }
                }
                CollectionFormat::Csv if !items.is_empty() => {
                    request.query.push((spec.name.to_string(), items.join(",")));
                }
                CollectionFormat::Csv => {}
            },
            value => {
                if let Some(text) = value.to_text() {
                    request.query.push((spec.name.to_string(), text));
                }
            }
        }
    }

    for spec in operation.fields_in(Placement::Header) {
        if let Some(text) = source.field(spec.name).to_text() {
            check_header_value(spec.name, &text)?;
            request.set_header(spec.name, text);
        }
    }

    let body: BTreeMap<&str, Value> = operation
        .fields_in(Placement::Body)
        .filter_map(|spec| source.field(spec.name).to_json().map(|v| (spec.name, v)))
        .collect();
    if !body.is_empty() {
        let bytes = serde_json::to_vec(&body).map_err(|e| BuildError::Encoding(e.to_string()))?;
        request.set_header(headers::CONTENT_TYPE, media_types::JSON);
        request.body = Some(Bytes::from(bytes));
    }

    if let Some(id) = &metadata.correlation_id {
        check_header_value(headers::OPC_REQUEST_ID, id)?;
        request.set_header(headers::OPC_REQUEST_ID, id.clone());
    }

    Ok(request)
}

fn render_path<S>(operation: &Operation, source: &S) -> Result<String, BuildError>
where
    S: FieldSource + ?Sized,
{
    let template = operation.path_template;
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            BuildError::Encoding(format!("unterminated placeholder in path template {template}"))
        })?;
        let name = &after[..end];

        let spec = operation
            .fields_in(Placement::Path)
            .find(|f| f.name == name)
            .ok_or_else(|| BuildError::UnknownPlaceholder(name.to_string()))?;
        let text = source
            .field(spec.name)
            .to_text()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BuildError::MissingField(spec.name.to_string()))?;

        out.push_str(&urlencoding::encode(&text));
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Reject values that cannot travel as a single header line.
///
/// Control characters other than horizontal tab are refused here so they
/// never reach the transport.
pub(crate) fn check_header_value(name: &str, value: &str) -> Result<(), BuildError> {
    if let Some(c) = value.chars().find(|&c| c.is_control() && c != '\t') {
        return Err(BuildError::InvalidHeaderValue {
            name: name.to_string(),
            reason: format!("contains control character {:?}", c),
        });
    }
    Ok(())
}
