//! Identity service operations.
//!
//! Each operation is a static [`Operation`](crate::types::Operation) plus a
//! request type that exposes its fields and a response type that picks the
//! declared headers and body out of the parsed response.
//!
//! ```
//! use ctlplane::identity::{DeletePolicyRequest, DELETE_POLICY};
//! use ctlplane::protocol::{attach_precondition, build};
//! use ctlplane::OperationRequest;
//!
//! let request = DeletePolicyRequest::new("p-1").with_if_match("etag-7");
//! let wire = build(&DELETE_POLICY, &request, request.metadata()).unwrap();
//! let wire = attach_precondition(wire, request.concurrency_token()).unwrap();
//!
//! assert_eq!(wire.target(), "/policies/p-1");
//! assert_eq!(wire.header("if-match"), Some("etag-7"));
//! assert!(wire.body.is_none());
//! ```

mod policy;

pub use policy::{
    DeletePolicyRequest, DeletePolicyResponse, GetPolicyRequest, GetPolicyResponse,
    ListPoliciesRequest, ListPoliciesResponse, Policy, UpdatePolicyDetails, UpdatePolicyRequest,
    UpdatePolicyResponse, DELETE_POLICY, GET_POLICY, LIST_POLICIES, UPDATE_POLICY,
};
