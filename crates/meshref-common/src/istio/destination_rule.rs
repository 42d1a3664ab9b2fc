//! Istio DestinationRule types

use serde::{Deserialize, Serialize};

use crate::kube_utils::{IstioObject, ObjectMeta, ObjectType};

/// Istio DestinationRule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRule {
    /// API version
    #[serde(default = "DestinationRule::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "DestinationRule::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    #[serde(default)]
    pub spec: DestinationRuleSpec,
}

impl IstioObject for DestinationRule {
    const OBJECT_TYPE: ObjectType = ObjectType::DestinationRule;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl DestinationRule {
    fn api_version() -> String {
        Self::OBJECT_TYPE.api_version().to_string()
    }
    fn kind() -> String {
        Self::OBJECT_TYPE.kind().to_string()
    }

    /// Create a new DestinationRule
    pub fn new(metadata: ObjectMeta, spec: DestinationRuleSpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }

    /// Create a DestinationRule for a single host
    pub fn for_host(
        name: impl Into<String>,
        namespace: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self::new(
            ObjectMeta::new(name, namespace),
            DestinationRuleSpec {
                host: host.into(),
                export_to: vec![],
            },
        )
    }
}

/// DestinationRule spec
///
/// Traffic policy and subsets are not needed for resolution and are ignored
/// when decoding.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRuleSpec {
    /// Host the rule applies to (short name, `svc.ns`, FQDN or wildcard)
    #[serde(default)]
    pub host: String,
    /// Namespaces this rule is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_ignores_traffic_policy() {
        let dr: DestinationRule = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "dr1", "namespace": "ns1", "clusterName": "east"},
            "spec": {
                "host": "reviews",
                "trafficPolicy": {"tls": {"mode": "ISTIO_MUTUAL"}}
            }
        }))
        .unwrap();

        assert_eq!(dr.spec.host, "reviews");
        assert_eq!(dr.metadata.cluster_name, "east");
        assert_eq!(dr.kind, "DestinationRule");
    }

    #[test]
    fn reference_points_at_rule() {
        let reference = DestinationRule::for_host("dr1", "ns1", "reviews").reference();
        assert_eq!(reference.name, "dr1");
        assert_eq!(reference.namespace, "ns1");
        assert_eq!(reference.object_type, ObjectType::DestinationRule);
    }
}
