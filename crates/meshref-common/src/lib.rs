//! Common types for meshref: Istio resources, host resolution, references, errors

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod host;
pub mod istio;
pub mod kube_utils;
pub mod references;
pub mod snapshot;
pub mod telemetry;

pub use config::ResolverConfig;
pub use error::Error;
pub use host::{Host, HostResolver, SidecarHost};
pub use kube_utils::{IstioObject, Namespace, Namespaces, ObjectMeta, ObjectType};
pub use references::{
    IstioReference, IstioReferenceKey, IstioReferences, IstioReferencesMap, ServiceReference,
};
pub use snapshot::ResourceSnapshot;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Default Istio identity domain appended to namespace-qualified service names
pub const DEFAULT_IDENTITY_DOMAIN: &str = "svc.cluster.local";

/// Environment variable overriding the identity domain
pub const IDENTITY_DOMAIN_ENV: &str = "MESHREF_IDENTITY_DOMAIN";
