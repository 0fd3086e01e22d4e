//! Policy operations.

use crate::core::protocol::headers;
use crate::core::types::{
    BodyShape, FieldSource, FieldSpec, FieldValue, Method, Operation, OperationRequest,
    OperationResponse, ParsedResponse, RequestMetadata, ResponseHeader, WireResponse,
};
use serde::{Deserialize, Serialize};

/// A set of access statements attached to a compartment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub compartment_id: String,
    pub name: String,
    #[serde(default)]
    pub statements: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    /// Date the statements are evaluated against; `None` means "always latest".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
}

pub static GET_POLICY: Operation = Operation {
    name: "GetPolicy",
    method: Method::Get,
    path_template: "/policies/{policyId}",
    fields: &[FieldSpec::path("policyId")],
    response_headers: &[
        ResponseHeader::string(headers::ETAG),
        ResponseHeader::string(headers::OPC_REQUEST_ID),
    ],
    response_body: BodyShape::Json,
};

pub static LIST_POLICIES: Operation = Operation {
    name: "ListPolicies",
    method: Method::Get,
    path_template: "/policies",
    fields: &[
        FieldSpec::query("compartmentId").required(),
        FieldSpec::query("page"),
        FieldSpec::query("limit"),
        FieldSpec::query("lifecycleState"),
    ],
    response_headers: &[
        ResponseHeader::string(headers::OPC_NEXT_PAGE),
        ResponseHeader::string(headers::OPC_REQUEST_ID),
    ],
    response_body: BodyShape::Json,
};

pub static UPDATE_POLICY: Operation = Operation {
    name: "UpdatePolicy",
    method: Method::Put,
    path_template: "/policies/{policyId}",
    fields: &[
        FieldSpec::path("policyId"),
        FieldSpec::body("description"),
        FieldSpec::body("statements"),
        FieldSpec::body("versionDate"),
    ],
    response_headers: &[
        ResponseHeader::string(headers::ETAG),
        ResponseHeader::string(headers::OPC_REQUEST_ID),
    ],
    response_body: BodyShape::Json,
};

pub static DELETE_POLICY: Operation = Operation {
    name: "DeletePolicy",
    method: Method::Delete,
    path_template: "/policies/{policyId}",
    fields: &[FieldSpec::path("policyId")],
    response_headers: &[ResponseHeader::string(headers::OPC_REQUEST_ID)],
    response_body: BodyShape::None,
};

// ---- GetPolicy ----

#[derive(Clone, Debug, Default)]
pub struct GetPolicyRequest {
    pub policy_id: String,
    pub metadata: RequestMetadata,
}

impl GetPolicyRequest {
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            metadata: RequestMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl FieldSource for GetPolicyRequest {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "policyId" => FieldValue::from(&self.policy_id),
            _ => FieldValue::Absent,
        }
    }
}

impl OperationRequest for GetPolicyRequest {
    type Response = GetPolicyResponse;

    fn operation(&self) -> &'static Operation {
        &GET_POLICY
    }

    fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }
}

#[derive(Clone, Debug)]
pub struct GetPolicyResponse {
    pub raw_response: WireResponse,
    pub policy: Policy,
    /// Concurrency token for a later update or delete.
    pub etag: Option<String>,
    pub opc_request_id: Option<String>,
}

impl OperationResponse for GetPolicyResponse {
    type Body = Policy;

    fn from_parsed(parsed: ParsedResponse<Policy>) -> Self {
        let etag = parsed.header_str(headers::ETAG);
        let opc_request_id = parsed.header_str(headers::OPC_REQUEST_ID);
        let (raw_response, _, policy) = parsed.into_parts();
        GetPolicyResponse {
            raw_response,
            policy: policy.unwrap_or_default(),
            etag,
            opc_request_id,
        }
    }
}

// ---- ListPolicies ----

#[derive(Clone, Debug, Default)]
pub struct ListPoliciesRequest {
    pub compartment_id: String,
    /// Value of `opc-next-page` from the previous page.
    pub page: Option<String>,
    pub limit: Option<u32>,
    pub lifecycle_state: Option<String>,
    pub metadata: RequestMetadata,
}

impl ListPoliciesRequest {
    pub fn new(compartment_id: impl Into<String>) -> Self {
        Self {
            compartment_id: compartment_id.into(),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_lifecycle_state(mut self, state: impl Into<String>) -> Self {
        self.lifecycle_state = Some(state.into());
        self
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl FieldSource for ListPoliciesRequest {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "compartmentId" => FieldValue::from(&self.compartment_id),
            "page" => FieldValue::from(&self.page),
            "limit" => FieldValue::from(self.limit),
            "lifecycleState" => FieldValue::from(&self.lifecycle_state),
            _ => FieldValue::Absent,
        }
    }
}

impl OperationRequest for ListPoliciesRequest {
    type Response = ListPoliciesResponse;

    fn operation(&self) -> &'static Operation {
        &LIST_POLICIES
    }

    fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }
}

#[derive(Clone, Debug)]
pub struct ListPoliciesResponse {
    pub raw_response: WireResponse,
    pub items: Vec<Policy>,
    /// Present when more pages follow.
    pub opc_next_page: Option<String>,
    pub opc_request_id: Option<String>,
}

impl OperationResponse for ListPoliciesResponse {
    type Body = Vec<Policy>;

    fn from_parsed(parsed: ParsedResponse<Vec<Policy>>) -> Self {
        let opc_next_page = parsed.header_str(headers::OPC_NEXT_PAGE);
        let opc_request_id = parsed.header_str(headers::OPC_REQUEST_ID);
        let (raw_response, _, items) = parsed.into_parts();
        ListPoliciesResponse {
            raw_response,
            items: items.unwrap_or_default(),
            opc_next_page,
            opc_request_id,
        }
    }
}

// ---- UpdatePolicy ----

/// Changes to apply; `None` fields are left untouched by the service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdatePolicyRequest {
    pub policy_id: String,
    pub details: UpdatePolicyDetails,
    /// Sent as `if-match`; the update applies only if it matches the current etag.
    pub if_match: Option<String>,
    pub metadata: RequestMetadata,
}

impl UpdatePolicyRequest {
    pub fn new(policy_id: impl Into<String>, details: UpdatePolicyDetails) -> Self {
        Self {
            policy_id: policy_id.into(),
            details,
            ..Default::default()
        }
    }

    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl FieldSource for UpdatePolicyRequest {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "policyId" => FieldValue::from(&self.policy_id),
            "description" => FieldValue::from(&self.details.description),
            "statements" => FieldValue::from(&self.details.statements),
            "versionDate" => FieldValue::from(&self.details.version_date),
            _ => FieldValue::Absent,
        }
    }
}

impl OperationRequest for UpdatePolicyRequest {
    type Response = UpdatePolicyResponse;

    fn operation(&self) -> &'static Operation {
        &UPDATE_POLICY
    }

    fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Clone, Debug)]
pub struct UpdatePolicyResponse {
    pub raw_response: WireResponse,
    pub policy: Policy,
    pub etag: Option<String>,
    pub opc_request_id: Option<String>,
}

impl OperationResponse for UpdatePolicyResponse {
    type Body = Policy;

    fn from_parsed(parsed: ParsedResponse<Policy>) -> Self {
        let etag = parsed.header_str(headers::ETAG);
        let opc_request_id = parsed.header_str(headers::OPC_REQUEST_ID);
        let (raw_response, _, policy) = parsed.into_parts();
        UpdatePolicyResponse {
            raw_response,
            policy: policy.unwrap_or_default(),
            etag,
            opc_request_id,
        }
    }
}

// ---- DeletePolicy ----

#[derive(Clone, Debug, Default)]
pub struct DeletePolicyRequest {
    pub policy_id: String,
    /// Sent as `if-match`; the delete applies only if it matches the current etag.
    pub if_match: Option<String>,
    pub metadata: RequestMetadata,
}

impl DeletePolicyRequest {
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            ..Default::default()
        }
    }

    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl FieldSource for DeletePolicyRequest {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "policyId" => FieldValue::from(&self.policy_id),
            _ => FieldValue::Absent,
        }
    }
}

impl OperationRequest for DeletePolicyRequest {
    type Response = DeletePolicyResponse;

    fn operation(&self) -> &'static Operation {
        &DELETE_POLICY
    }

    fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Clone, Debug)]
pub struct DeletePolicyResponse {
    pub raw_response: WireResponse,
    pub opc_request_id: Option<String>,
}

impl OperationResponse for DeletePolicyResponse {
    type Body = ();

    fn from_parsed(parsed: ParsedResponse<()>) -> Self {
        DeletePolicyResponse {
            opc_request_id: parsed.header_str(headers::OPC_REQUEST_ID),
            raw_response: parsed.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BuildError;
    use crate::core::protocol::{attach_precondition, build, encode_response, parse};
    use std::collections::BTreeMap;

    fn policy() -> Policy {
        Policy {
            id: "p-1".into(),
            compartment_id: "c-1".into(),
            name: "admins".into(),
            statements: vec!["allow group admins to manage all-resources in tenancy".into()],
            description: "tenancy admins".into(),
            lifecycle_state: Some("ACTIVE".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_operations_declare_their_placeholders() {
        for op in [&GET_POLICY, &LIST_POLICIES, &UPDATE_POLICY, &DELETE_POLICY] {
            for name in op.placeholders() {
                assert!(op.field(name).is_some(), "{op} lacks {name}");
            }
        }
    }

    #[test]
    fn test_policy_json_is_camel_case() {
        let json = serde_json::to_value(policy()).unwrap();
        assert_eq!(json["compartmentId"], "c-1");
        assert_eq!(json["lifecycleState"], "ACTIVE");
        assert!(json.get("versionDate").is_none());
    }

    #[test]
    fn test_list_request_query() {
        let request = ListPoliciesRequest::new("c-1").with_limit(50).with_page("next-2");
        let wire = build(request.operation(), &request, request.metadata()).unwrap();
        assert_eq!(wire.target(), "/policies?compartmentId=c-1&page=next-2&limit=50");
    }

    #[test]
    fn test_list_requires_compartment() {
        let request = ListPoliciesRequest::default();
        let err = build(request.operation(), &request, request.metadata()).unwrap_err();
        assert_eq!(err, BuildError::MissingField("compartmentId".into()));
    }

    #[test]
    fn test_update_request_body_and_token() {
        let details = UpdatePolicyDetails {
            statements: Some(vec!["allow group a to read all-resources in tenancy".into()]),
            ..Default::default()
        };
        let request = UpdatePolicyRequest::new("p-1", details).with_if_match("etag-3");
        let wire = build(request.operation(), &request, request.metadata()).unwrap();
        let wire = attach_precondition(wire, request.concurrency_token()).unwrap();

        assert_eq!(wire.method, Method::Put);
        assert_eq!(wire.header("if-match"), Some("etag-3"));
        assert_eq!(
            wire.body.as_deref(),
            Some(&br#"{"statements":["allow group a to read all-resources in tenancy"]}"#[..])
        );
    }

    #[test]
    fn test_get_response_fields() {
        let mut fields = BTreeMap::new();
        fields.insert(headers::ETAG, FieldValue::from("etag-9"));
        fields.insert(headers::OPC_REQUEST_ID, FieldValue::from("req-1"));
        let wire = encode_response(&GET_POLICY, 200, &fields, Some(&policy())).unwrap();

        let response = GetPolicyResponse::from_parsed(parse(wire, &GET_POLICY).unwrap());
        assert_eq!(response.policy, policy());
        assert_eq!(response.etag.as_deref(), Some("etag-9"));
        assert_eq!(response.opc_request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_list_response_next_page() {
        let wire = WireResponse::new(200, serde_json::to_vec(&vec![policy(), policy()]).unwrap())
            .with_header("opc-next-page", "page-2");
        let response = ListPoliciesResponse::from_parsed(parse(wire, &LIST_POLICIES).unwrap());
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.opc_next_page.as_deref(), Some("page-2"));
        assert!(response.opc_request_id.is_none());
    }

    #[test]
    fn test_delete_response_keeps_raw() {
        let wire = WireResponse::new(204, "").with_header("Opc-Request-Id", "req-5");
        let response = DeletePolicyResponse::from_parsed(parse(wire, &DELETE_POLICY).unwrap());
        assert_eq!(response.opc_request_id.as_deref(), Some("req-5"));
        assert_eq!(response.raw_response.status, 204);
    }
}
