//! Istio resource types read during reference resolution
//!
//! Types for decoding:
//! - Istio ServiceEntry (hosts advertised to the mesh)
//! - Istio DestinationRule (traffic policy for one host)
//! - Istio Sidecar (egress host visibility)
//! - Istio AuthorizationPolicy (operation hosts)
//! - Registry services discovered by the control plane
//!
//! All config kinds implement the `IstioObject` trait so they can describe
//! themselves as reference targets.

mod authorization_policy;
mod destination_rule;
mod registry;
mod service_entry;
mod sidecar;

pub use authorization_policy::{
    AuthorizationOperation, AuthorizationPolicy, AuthorizationPolicySpec, AuthorizationRule,
    AuthorizationSource, OperationSpec, SourceSpec, WorkloadSelector,
};
pub use destination_rule::{DestinationRule, DestinationRuleSpec};
pub use registry::RegistryService;
pub use service_entry::{ServiceEntry, ServiceEntryPort, ServiceEntrySpec};
pub use sidecar::{EgressListener, Sidecar, SidecarSpec};
