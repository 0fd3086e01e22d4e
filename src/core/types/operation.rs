//! Static operation descriptors.

use crate::core::types::field::{FieldSpec, Placement};
use std::fmt;

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded shape of a response header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderShape {
    Str,
    Int,
    Bool,
}

/// Declaration of one header-carried response field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub name: &'static str,
    pub shape: HeaderShape,
}

impl ResponseHeader {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            shape: HeaderShape::Str,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            shape: HeaderShape::Int,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            shape: HeaderShape::Bool,
        }
    }
}

/// Declared response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyShape {
    /// The body is ignored.
    #[default]
    None,
    /// The body must deserialize from JSON into the response's body type.
    Json,
}

/// A named remote procedure with a fixed method and path template.
///
/// ```
/// use ctlplane::types::{BodyShape, FieldSpec, Method, Operation, ResponseHeader};
///
/// static DELETE_WIDGET: Operation = Operation {
///     name: "DeleteWidget",
///     method: Method::Delete,
///     path_template: "/widgets/{widgetId}",
///     fields: &[FieldSpec::path("widgetId")],
///     response_headers: &[ResponseHeader::string("opc-request-id")],
///     response_body: BodyShape::None,
/// };
/// assert_eq!(DELETE_WIDGET.placeholders(), vec!["widgetId"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub method: Method,
    pub path_template: &'static str,
    pub fields: &'static [FieldSpec],
    pub response_headers: &'static [ResponseHeader],
    pub response_body: BodyShape,
}

impl Operation {
    /// Declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared fields with the given placement, in declaration order.
    pub fn fields_in(&self, placement: Placement) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.placement == placement)
    }

    /// Placeholder names of the path template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.path_template;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    names.push(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        names
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.method, self.path_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LIST: Operation = Operation {
        name: "ListThings",
        method: Method::Get,
        path_template: "/compartments/{compartmentId}/things/{thingId}/children",
        fields: &[
            FieldSpec::path("compartmentId"),
            FieldSpec::path("thingId"),
            FieldSpec::query("page"),
        ],
        response_headers: &[],
        response_body: BodyShape::Json,
    };

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(LIST.placeholders(), vec!["compartmentId", "thingId"]);
    }

    #[test]
    fn test_fields_in_placement() {
        let names: Vec<_> = LIST.fields_in(Placement::Path).map(|f| f.name).collect();
        assert_eq!(names, vec!["compartmentId", "thingId"]);
        assert!(LIST.field("page").is_some());
        assert!(LIST.field("missing").is_none());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Put.to_string(), "PUT");
    }
}
