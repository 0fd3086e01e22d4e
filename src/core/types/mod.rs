//! Core data types: operation descriptors, field placement and wire messages.

mod field;
mod operation;
mod request;
mod response;

pub use bytes::Bytes;
pub use field::{CollectionFormat, FieldSource, FieldSpec, FieldValue, Placement};
pub use operation::{BodyShape, HeaderShape, Method, Operation, ResponseHeader};
pub use request::{OperationRequest, RequestMetadata, WireRequest};
pub use response::{OperationResponse, ParsedResponse, WireResponse};
