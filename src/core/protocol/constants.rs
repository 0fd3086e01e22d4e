//! Wire constants.

/// Header names, lowercase as stored in [`crate::types::WireRequest`].
pub mod headers {
    pub const IF_MATCH: &str = "if-match";
    pub const ETAG: &str = "etag";
    /// Correlation identifier, sent by the client and echoed by the service.
    pub const OPC_REQUEST_ID: &str = "opc-request-id";
    pub const OPC_NEXT_PAGE: &str = "opc-next-page";
    pub const RETRY_AFTER: &str = "retry-after";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const ACCEPT: &str = "accept";
}

pub mod media_types {
    pub const JSON: &str = "application/json";
}
