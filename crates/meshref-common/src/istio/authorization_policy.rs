//! Istio AuthorizationPolicy types
//!
//! Only the `to.operation.hosts` lists take part in reference resolution;
//! sources, ports, methods and paths are decoded so policies round-trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kube_utils::{IstioObject, ObjectMeta, ObjectType};

/// Istio AuthorizationPolicy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPolicy {
    /// API version
    #[serde(default = "AuthorizationPolicy::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "AuthorizationPolicy::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    #[serde(default)]
    pub spec: AuthorizationPolicySpec,
}

impl IstioObject for AuthorizationPolicy {
    const OBJECT_TYPE: ObjectType = ObjectType::AuthorizationPolicy;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl AuthorizationPolicy {
    fn api_version() -> String {
        Self::OBJECT_TYPE.api_version().to_string()
    }
    fn kind() -> String {
        Self::OBJECT_TYPE.kind().to_string()
    }

    /// Create a new AuthorizationPolicy
    pub fn new(metadata: ObjectMeta, spec: AuthorizationPolicySpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }

    /// Create an ALLOW policy with a single rule permitting requests to `hosts`
    pub fn allow_to_hosts(
        name: impl Into<String>,
        namespace: impl Into<String>,
        hosts: Vec<String>,
    ) -> Self {
        Self::new(
            ObjectMeta::new(name, namespace),
            AuthorizationPolicySpec {
                selector: None,
                action: "ALLOW".to_string(),
                rules: vec![AuthorizationRule {
                    from: vec![],
                    to: vec![AuthorizationOperation {
                        operation: Some(OperationSpec {
                            hosts,
                            ..Default::default()
                        }),
                    }],
                }],
            },
        )
    }

    /// Operation host lists across all rules, skipping `to` clauses without
    /// an operation or with no hosts
    pub fn operation_hosts(&self) -> impl Iterator<Item = &[String]> {
        self.spec
            .rules
            .iter()
            .flat_map(|rule| rule.to.iter())
            .filter_map(|to| to.operation.as_ref())
            .map(|operation| operation.hosts.as_slice())
            .filter(|hosts| !hosts.is_empty())
    }
}

/// AuthorizationPolicy spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPolicySpec {
    /// Selector for workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<WorkloadSelector>,

    /// Action: ALLOW, DENY, AUDIT, CUSTOM (empty = ALLOW)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    /// Rules defining who can access what
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<AuthorizationRule>,
}

/// Workload selector for AuthorizationPolicy
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSelector {
    /// Match labels
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

/// Authorization rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationRule {
    /// Source conditions (who is calling)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<AuthorizationSource>,
    /// Destination conditions (what operation)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<AuthorizationOperation>,
}

/// Authorization source (caller identity)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationSource {
    /// Source specification
    #[serde(default)]
    pub source: SourceSpec,
}

/// Source specification
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpec {
    /// SPIFFE principals
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<String>,
    /// Source namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}

/// Authorization operation (what's being accessed)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationOperation {
    /// Operation specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationSpec>,
}

/// Operation specification
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationSpec {
    /// Allowed hosts (plain host strings)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    /// Allowed ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Allowed HTTP methods
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    /// Allowed paths
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}
