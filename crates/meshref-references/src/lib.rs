//! Reference resolution between Istio ServiceEntries and related config
//!
//! Given a [`ResourceSnapshot`](meshref_common::ResourceSnapshot), works out
//! which DestinationRules, Sidecars and AuthorizationPolicies point at each
//! ServiceEntry's hosts, and which registry services back them.
//!
//! # Modules
//!
//! - [`registry`] - Registry service matching (`ServiceMatcher`)
//! - [`service_entry`] - ServiceEntry reference extraction and aggregation

#![deny(missing_docs)]

pub mod registry;
pub mod service_entry;

pub use registry::{ExportToMatcher, ServiceMatcher};
pub use service_entry::ServiceEntryReferences;

use meshref_common::IstioReferencesMap;

/// Something that can report the references of a set of config objects.
///
/// Each object kind gets its own checker; callers merge the resulting maps
/// with [`IstioReferencesMap::merge`].
pub trait ReferenceChecker {
    /// Resolve references for every object this checker covers
    fn references(&self) -> IstioReferencesMap;
}
