//! Registry services discovered by the mesh control plane

use serde::{Deserialize, Serialize};

use crate::references::ServiceReference;

/// A service known to the mesh registry.
///
/// Supplied externally and read-only; `export_to` lists the namespaces the
/// service is visible from (`*` for all, `.` for its own namespace, `~` for
/// none). An empty list means no export restriction.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryService {
    /// Service hostname (usually an FQDN)
    pub hostname: String,
    /// Namespace owning the service
    #[serde(default)]
    pub namespace: String,
    /// Namespaces the service is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,
}

impl RegistryService {
    /// Create a registry service without export restrictions
    pub fn new(hostname: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            namespace: namespace.into(),
            export_to: vec![],
        }
    }

    /// Restrict visibility to the given namespaces
    pub fn exported_to(mut self, namespaces: Vec<String>) -> Self {
        self.export_to = namespaces;
        self
    }

    /// Reference to this service
    pub fn reference(&self) -> ServiceReference {
        ServiceReference::new(&self.hostname, &self.namespace)
    }
}
