//! Istio ServiceEntry types
//!
//! A ServiceEntry registers hosts with the mesh. Resolution only looks at the
//! hosts; ports, location and resolution are decoded for completeness.

use serde::{Deserialize, Serialize};

use crate::kube_utils::{IstioObject, ObjectMeta, ObjectType};
use crate::references::IstioReferenceKey;

/// Istio ServiceEntry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// API version
    #[serde(default = "ServiceEntry::api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "ServiceEntry::kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    #[serde(default)]
    pub spec: ServiceEntrySpec,
}

impl IstioObject for ServiceEntry {
    const OBJECT_TYPE: ObjectType = ObjectType::ServiceEntry;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl ServiceEntry {
    fn api_version() -> String {
        Self::OBJECT_TYPE.api_version().to_string()
    }
    fn kind() -> String {
        Self::OBJECT_TYPE.kind().to_string()
    }

    /// Create a new ServiceEntry
    pub fn new(metadata: ObjectMeta, spec: ServiceEntrySpec) -> Self {
        Self {
            api_version: Self::api_version(),
            kind: Self::kind(),
            metadata,
            spec,
        }
    }

    /// Create a ServiceEntry advertising the given hosts
    pub fn with_hosts(
        name: impl Into<String>,
        namespace: impl Into<String>,
        hosts: Vec<String>,
    ) -> Self {
        Self::new(
            ObjectMeta::new(name, namespace),
            ServiceEntrySpec {
                hosts,
                ..Default::default()
            },
        )
    }

    /// Key under which this ServiceEntry's references are reported
    pub fn reference_key(&self) -> IstioReferenceKey {
        IstioReferenceKey::new(
            &self.metadata.namespace,
            &self.metadata.name,
            Self::OBJECT_TYPE,
        )
    }

    /// Whether this ServiceEntry advertises exactly this host
    pub fn has_host(&self, host: &str) -> bool {
        self.spec.hosts.iter().any(|h| h == host)
    }
}

/// ServiceEntry spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntrySpec {
    /// Hosts (DNS names or wildcard patterns)
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServiceEntryPort>,
    /// Location: MESH_EXTERNAL or MESH_INTERNAL
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    /// Resolution: DNS, STATIC, NONE
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resolution: String,
    /// Namespaces this entry is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,
}

/// ServiceEntry port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServiceEntryPort {
    /// Port number
    pub number: u16,
    /// Port name
    pub name: String,
    /// Protocol (HTTP, HTTPS, TCP, GRPC)
    pub protocol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_manifest_with_defaults() {
        let se: ServiceEntry = serde_json::from_value(serde_json::json!({
            "metadata": {"name": "se1", "namespace": "ns1"},
            "spec": {"hosts": ["foo.ns1.svc.cluster.local"]}
        }))
        .unwrap();

        assert_eq!(se.kind, "ServiceEntry");
        assert_eq!(se.api_version, "networking.istio.io/v1");
        assert_eq!(se.spec.hosts, vec!["foo.ns1.svc.cluster.local"]);
        assert!(se.spec.ports.is_empty());
    }

    #[test]
    fn decodes_full_manifest() {
        let se: ServiceEntry = serde_json::from_value(serde_json::json!({
            "apiVersion": "networking.istio.io/v1beta1",
            "kind": "ServiceEntry",
            "metadata": {"name": "external-api", "namespace": "ns1"},
            "spec": {
                "hosts": ["api.example.com"],
                "ports": [{"number": 443, "name": "https", "protocol": "HTTPS"}],
                "location": "MESH_EXTERNAL",
                "resolution": "DNS",
                "exportTo": ["."]
            }
        }))
        .unwrap();

        assert_eq!(se.api_version, "networking.istio.io/v1beta1");
        assert_eq!(se.spec.ports[0].number, 443);
        assert_eq!(se.spec.location, "MESH_EXTERNAL");
        assert_eq!(se.spec.export_to, vec!["."]);
    }

    #[test]
    fn reference_key_uses_service_entry_type() {
        let se = ServiceEntry::with_hosts("se1", "ns1", vec![]);
        let key = se.reference_key();
        assert_eq!(key.namespace, "ns1");
        assert_eq!(key.name, "se1");
        assert_eq!(key.object_type, ObjectType::ServiceEntry);
    }

    #[test]
    fn has_host_is_exact() {
        let se = ServiceEntry::with_hosts("se1", "ns1", vec!["foo.ns1.svc.cluster.local".into()]);
        assert!(se.has_host("foo.ns1.svc.cluster.local"));
        assert!(!se.has_host("foo"));
    }
}
