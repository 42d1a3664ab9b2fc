//! Istio Sidecar types

use serde::{Deserialize, Serialize};

use crate::kube_utils::{IstioObject, ObjectMeta, ObjectType};

/// Istio Sidecar
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sidecar {
    /// API version
    #[serde(default = "Sidecar::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Sidecar::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    #[serde(default)]
    pub spec: SidecarSpec,
}

impl IstioObject for Sidecar {
    const OBJECT_TYPE: ObjectType = ObjectType::Sidecar;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Sidecar {
    fn api_version() -> String {
        Self::OBJECT_TYPE.api_version().to_string()
    }
    fn kind() -> String {
        Self::OBJECT_TYPE.kind().to_string()
    }

    /// Create a new Sidecar
    pub fn new(metadata: ObjectMeta, spec: SidecarSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }

    /// Create a Sidecar with a single egress listener
    pub fn with_egress_hosts(
        name: impl Into<String>,
        namespace: impl Into<String>,
        hosts: Vec<String>,
    ) -> Self {
        Self::new(
            ObjectMeta::new(name, namespace),
            SidecarSpec {
                egress: vec![EgressListener { hosts }],
            },
        )
    }

    /// All egress host expressions, across listeners, in declaration order
    pub fn egress_hosts(&self) -> impl Iterator<Item = &str> {
        self.spec
            .egress
            .iter()
            .flat_map(|listener| listener.hosts.iter().map(String::as_str))
    }
}

/// Sidecar spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SidecarSpec {
    /// Egress listeners
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub egress: Vec<EgressListener>,
}

/// Sidecar egress listener
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EgressListener {
    /// Host expressions in `namespace/dnsName` form
    #[serde(default)]
    pub hosts: Vec<String>,
}
