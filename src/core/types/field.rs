//! Field placement model: where each request field goes on the wire.

use serde_json::Value;
use std::collections::BTreeMap;

/// Wire location of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
    Query,
    Header,
    /// Aggregated into the JSON request body under the field name.
    Body,
}

/// Rendering of list-valued query fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFormat {
    /// `key=a&key=b`
    #[default]
    Multi,
    /// `key=a,b`
    Csv,
}

/// Static declaration of one request field.
///
/// Declarations are built with the `const` constructors so an operation's
/// field table can live in a `static`:
///
/// ```
/// use ctlplane::types::FieldSpec;
///
/// const FIELDS: &[FieldSpec] = &[
///     FieldSpec::path("policyId"),
///     FieldSpec::query("compartmentId").required(),
///     FieldSpec::query("lifecycleState").csv(),
/// ];
/// assert!(FIELDS[1].mandatory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub placement: Placement,
    pub mandatory: bool,
    pub collection: CollectionFormat,
}

impl FieldSpec {
    const fn new(name: &'static str, placement: Placement) -> Self {
        Self {
            name,
            placement,
            mandatory: false,
            collection: CollectionFormat::Multi,
        }
    }

    /// Path fields are always mandatory.
    pub const fn path(name: &'static str) -> Self {
        Self::new(name, Placement::Path).required()
    }

    pub const fn query(name: &'static str) -> Self {
        Self::new(name, Placement::Query)
    }

    pub const fn header(name: &'static str) -> Self {
        Self::new(name, Placement::Header)
    }

    pub const fn body(name: &'static str) -> Self {
        Self::new(name, Placement::Body)
    }

    pub const fn required(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub const fn csv(mut self) -> Self {
        self.collection = CollectionFormat::Csv;
        self
    }

    /// Whether the builder must reject an absent or empty value.
    #[inline]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory || matches!(self.placement, Placement::Path)
    }
}

/// A request field's value, as seen by the builder.
///
/// `Absent` is omission. `Str(String::new())` is an explicit empty value:
/// optional query and header fields still carry it, mandatory fields reject it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    Json(Value),
}

impl FieldValue {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// True when the value cannot satisfy a mandatory declaration.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Json(Value::Null) => true,
            _ => false,
        }
    }

    /// Scalar text form used for path segments and headers.
    ///
    /// Lists are comma-joined; JSON values use their compact serialization.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Str(s) => Some(s.clone()),
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::List(items) => Some(items.join(",")),
            FieldValue::Json(Value::String(s)) => Some(s.clone()),
            FieldValue::Json(value) => Some(value.to_string()),
        }
    }

    /// JSON form used for body aggregation.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Str(s) => Some(Value::String(s.clone())),
            FieldValue::Int(i) => Some(Value::from(*i)),
            FieldValue::Bool(b) => Some(Value::Bool(*b)),
            FieldValue::List(items) => Some(Value::from(items.clone())),
            FieldValue::Json(value) => Some(value.clone()),
        }
    }

    /// Wrap any serializable value as a JSON field.
    pub fn json<T: serde::Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(FieldValue::Json)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Str(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

impl<T> From<&Option<T>> for FieldValue
where
    T: Clone + Into<FieldValue>,
{
    fn from(value: &Option<T>) -> Self {
        value.clone().map_or(FieldValue::Absent, Into::into)
    }
}

/// Anything the builder can read declared fields from.
pub trait FieldSource {
    /// Value of the declared field `name`; `FieldValue::Absent` when unset.
    fn field(&self, name: &str) -> FieldValue;
}

impl FieldSource for BTreeMap<&'static str, FieldValue> {
    fn field(&self, name: &str) -> FieldValue {
        self.get(name).cloned().unwrap_or_default()
    }
}
