//! Resource snapshot handed over by the input collaborator
//!
//! A snapshot is the immutable set of objects one resolution pass works on.
//! How it was collected (cluster API, cache, files) is not this crate's
//! concern; it only needs to decode.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::istio::{AuthorizationPolicy, DestinationRule, RegistryService, ServiceEntry, Sidecar};
use crate::kube_utils::Namespaces;
use crate::{Error, Result};

/// Immutable input for one resolution pass. No ordering is assumed.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    /// Namespaces visible in this scope
    #[serde(default)]
    pub namespaces: Namespaces,
    /// ServiceEntries whose references are resolved
    #[serde(default)]
    pub service_entries: Vec<ServiceEntry>,
    /// DestinationRules
    #[serde(default)]
    pub destination_rules: Vec<DestinationRule>,
    /// Sidecars
    #[serde(default)]
    pub sidecars: Vec<Sidecar>,
    /// AuthorizationPolicies
    #[serde(default)]
    pub authorization_policies: Vec<AuthorizationPolicy>,
    /// Services discovered in the mesh registry
    #[serde(default)]
    pub registry_services: Vec<RegistryService>,
}

impl ResourceSnapshot {
    /// Decode a snapshot from JSON
    pub fn from_json(input: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(input).map_err(|e| {
            warn!(error = %e, "failed to decode resource snapshot");
            Error::serialization_for_kind("ResourceSnapshot", e.to_string())
        })?;
        debug!(
            namespaces = snapshot.namespaces.len(),
            objects = snapshot.object_count(),
            registry_services = snapshot.registry_services.len(),
            "decoded resource snapshot"
        );
        Ok(snapshot)
    }

    /// Total number of config objects in the snapshot
    pub fn object_count(&self) -> usize {
        self.service_entries.len()
            + self.destination_rules.len()
            + self.sidecars.len()
            + self.authorization_policies.len()
    }
}
