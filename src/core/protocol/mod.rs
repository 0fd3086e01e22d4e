//! Protocol-level rendering and decoding.

pub mod builder;
pub mod constants;
pub mod parser;
pub mod precondition;

pub use builder::build;
pub use constants::{headers, media_types};
pub use parser::{encode_response, parse, service_error};
pub use precondition::{attach_precondition, extract_token, is_precondition_failed};
