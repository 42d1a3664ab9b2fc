//! Kubernetes object metadata and object-kind handling
//!
//! Every Istio resource meshref reads carries the same `ObjectMeta` shape and
//! belongs to a closed set of kinds, each with a row in a static label table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::references::IstioReference;

// =============================================================================
// ObjectMeta
// =============================================================================

/// Kubernetes metadata for the Istio resources read during resolution.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    #[serde(default)]
    pub namespace: String,
    /// Cluster (identity domain) the object lives in; empty means the
    /// configured default
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
}

impl ObjectMeta {
    /// Create metadata for an object in the default cluster
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            cluster_name: String::new(),
        }
    }

    /// Set the cluster name
    pub fn with_cluster(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = cluster_name.into();
        self
    }
}

// =============================================================================
// ObjectType
// =============================================================================

/// Kinds of Istio configuration objects that take part in reference resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// networking.istio.io ServiceEntry
    ServiceEntry,
    /// networking.istio.io DestinationRule
    DestinationRule,
    /// networking.istio.io Sidecar
    Sidecar,
    /// security.istio.io AuthorizationPolicy
    AuthorizationPolicy,
}

/// (type, singular label, plural resource, kind, api version)
type LabelRow = (ObjectType, &'static str, &'static str, &'static str, &'static str);

static OBJECT_TYPE_LABELS: [LabelRow; 4] = [
    (
        ObjectType::ServiceEntry,
        "serviceentry",
        "serviceentries",
        "ServiceEntry",
        "networking.istio.io/v1",
    ),
    (
        ObjectType::DestinationRule,
        "destinationrule",
        "destinationrules",
        "DestinationRule",
        "networking.istio.io/v1",
    ),
    (
        ObjectType::Sidecar,
        "sidecar",
        "sidecars",
        "Sidecar",
        "networking.istio.io/v1",
    ),
    (
        ObjectType::AuthorizationPolicy,
        "authorizationpolicy",
        "authorizationpolicies",
        "AuthorizationPolicy",
        "security.istio.io/v1",
    ),
];

impl ObjectType {
    /// All object types, in label-table order
    pub const ALL: [ObjectType; 4] = [
        ObjectType::ServiceEntry,
        ObjectType::DestinationRule,
        ObjectType::Sidecar,
        ObjectType::AuthorizationPolicy,
    ];

    fn row(self) -> &'static LabelRow {
        // Rows are declared in discriminant order
        &OBJECT_TYPE_LABELS[self as usize]
    }

    /// Singular display label (e.g., "serviceentry")
    pub fn singular(self) -> &'static str {
        self.row().1
    }

    /// Plural resource name (e.g., "serviceentries")
    pub fn plural(self) -> &'static str {
        self.row().2
    }

    /// Kubernetes kind (e.g., "ServiceEntry")
    pub fn kind(self) -> &'static str {
        self.row().3
    }

    /// Full API version (e.g., "networking.istio.io/v1")
    pub fn api_version(self) -> &'static str {
        self.row().4
    }

    /// Look up an object type by its plural resource name
    pub fn from_plural(plural: &str) -> Option<Self> {
        OBJECT_TYPE_LABELS
            .iter()
            .find(|row| row.2 == plural)
            .map(|row| row.0)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

// =============================================================================
// IstioObject Trait
// =============================================================================

/// Trait for Istio resources with a compile-time known object type.
pub trait IstioObject {
    /// The kind of this resource
    const OBJECT_TYPE: ObjectType;

    /// Resource metadata
    fn metadata(&self) -> &ObjectMeta;

    /// Build an object reference pointing at this resource
    fn reference(&self) -> IstioReference {
        let meta = self.metadata();
        IstioReference::new(&meta.name, &meta.namespace, Self::OBJECT_TYPE)
    }
}

// =============================================================================
// Namespaces
// =============================================================================

/// A namespace visible in the current resolution scope
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    /// Namespace name
    pub name: String,
}

impl Namespace {
    /// Create a namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The set of namespaces visible to a resolution pass
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Namespaces(pub Vec<Namespace>);

impl Namespaces {
    /// Namespace names, in input order
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|ns| ns.name.clone()).collect()
    }

    /// Whether a namespace with this name is visible
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|ns| ns.name == name)
    }

    /// Number of visible namespaces
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no namespace is visible
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Namespaces {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Namespace::new).collect())
    }
}
