//! Reference model produced by a resolution pass
//!
//! An [`IstioReferencesMap`] maps the object doing the referencing (for
//! example a ServiceEntry) to the config objects and backing services it is
//! linked to. Maps are combined with [`IstioReferencesMap::merge`]: disjoint
//! keys are a plain union, shared keys concatenate both reference lists.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::kube_utils::ObjectType;

/// Reference to an Istio configuration object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioReference {
    /// Object name
    pub name: String,
    /// Object namespace
    pub namespace: String,
    /// Object kind
    pub object_type: ObjectType,
}

impl IstioReference {
    /// Create a new object reference
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            object_type,
        }
    }
}

/// Reference to a backing service discovered in the mesh registry.
///
/// Doubles as the deduplication key: two references are the same service when
/// both name and namespace are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceReference {
    /// Service hostname
    pub name: String,
    /// Service namespace
    pub namespace: String,
}

impl ServiceReference {
    /// Create a new service reference
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Identity of the object whose references are being reported
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioReferenceKey {
    /// Object namespace
    pub namespace: String,
    /// Object name
    pub name: String,
    /// Object kind
    pub object_type: ObjectType,
}

impl IstioReferenceKey {
    /// Create a new reference key
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            object_type,
        }
    }
}

impl fmt::Display for IstioReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.object_type, self.namespace, self.name)
    }
}

/// References found for a single object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioReferences {
    /// Config objects linked to this object
    #[serde(default)]
    pub object_references: Vec<IstioReference>,
    /// Registry services backing this object
    #[serde(default)]
    pub service_references: Vec<ServiceReference>,
}

impl IstioReferences {
    /// Create references from the two lists
    pub fn new(
        object_references: Vec<IstioReference>,
        service_references: Vec<ServiceReference>,
    ) -> Self {
        Self {
            object_references,
            service_references,
        }
    }

    /// Whether both lists are empty
    pub fn is_empty(&self) -> bool {
        self.object_references.is_empty() && self.service_references.is_empty()
    }

    /// Concatenate another set of references onto this one
    pub fn append(&mut self, mut other: IstioReferences) {
        self.object_references.append(&mut other.object_references);
        self.service_references.append(&mut other.service_references);
    }
}

/// Keyed collection of references, ordered by key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IstioReferencesMap(BTreeMap<IstioReferenceKey, IstioReferences>);

impl IstioReferencesMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding a single entry
    pub fn single(key: IstioReferenceKey, references: IstioReferences) -> Self {
        let mut map = BTreeMap::new();
        map.insert(key, references);
        Self(map)
    }

    /// Merge another map into this one and return the result.
    ///
    /// Keys only present in `other` are inserted as-is. Keys present in both
    /// get `other`'s object and service references appended to their own.
    pub fn merge(mut self, other: IstioReferencesMap) -> Self {
        self.merge_from(other);
        self
    }

    /// In-place form of [`merge`](Self::merge)
    pub fn merge_from(&mut self, other: IstioReferencesMap) {
        for (key, references) in other.0 {
            self.merge_entry(key, references);
        }
    }

    fn merge_entry(&mut self, key: IstioReferenceKey, references: IstioReferences) {
        match self.0.entry(key) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(references);
            }
            btree_map::Entry::Occupied(mut entry) => entry.get_mut().append(references),
        }
    }

    /// Get the references recorded for a key
    pub fn get(&self, key: &IstioReferenceKey) -> Option<&IstioReferences> {
        self.0.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, IstioReferenceKey, IstioReferences> {
        self.0.iter()
    }

    /// Iterate over keys in order
    pub fn keys(&self) -> btree_map::Keys<'_, IstioReferenceKey, IstioReferences> {
        self.0.keys()
    }
}

impl FromIterator<(IstioReferenceKey, IstioReferences)> for IstioReferencesMap {
    fn from_iter<I: IntoIterator<Item = (IstioReferenceKey, IstioReferences)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl Extend<(IstioReferenceKey, IstioReferences)> for IstioReferencesMap {
    fn extend<I: IntoIterator<Item = (IstioReferenceKey, IstioReferences)>>(&mut self, iter: I) {
        for (key, references) in iter {
            self.merge_entry(key, references);
        }
    }
}

impl IntoIterator for IstioReferencesMap {
    type Item = (IstioReferenceKey, IstioReferences);
    type IntoIter = btree_map::IntoIter<IstioReferenceKey, IstioReferences>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IstioReferencesMap {
    type Item = (&'a IstioReferenceKey, &'a IstioReferences);
    type IntoIter = btree_map::Iter<'a, IstioReferenceKey, IstioReferences>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Flattened wire form of one map entry
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReferencesEntry<'a> {
    #[serde(flatten)]
    key: &'a IstioReferenceKey,
    #[serde(flatten)]
    references: &'a IstioReferences,
}

impl Serialize for IstioReferencesMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.0
                .iter()
                .map(|(key, references)| ReferencesEntry { key, references }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(namespace: &str, name: &str) -> IstioReferenceKey {
        IstioReferenceKey::new(namespace, name, ObjectType::ServiceEntry)
    }

    fn dr_ref(name: &str) -> IstioReference {
        IstioReference::new(name, "ns1", ObjectType::DestinationRule)
    }

    fn refs(objects: Vec<IstioReference>, services: Vec<ServiceReference>) -> IstioReferences {
        IstioReferences::new(objects, services)
    }

    #[test]
    fn merge_disjoint_keys_is_union() {
        let left = IstioReferencesMap::single(key("ns1", "se1"), refs(vec![dr_ref("dr1")], vec![]));
        let right = IstioReferencesMap::single(key("ns1", "se2"), refs(vec![dr_ref("dr2")], vec![]));

        let merged = left.merge(right);

        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get(&key("ns1", "se1")).unwrap().object_references,
            vec![dr_ref("dr1")]
        );
        assert_eq!(
            merged.get(&key("ns1", "se2")).unwrap().object_references,
            vec![dr_ref("dr2")]
        );
    }

    #[test]
    fn merge_shared_key_concatenates_both_lists() {
        let left = IstioReferencesMap::single(
            key("ns1", "se1"),
            refs(
                vec![dr_ref("dr1")],
                vec![ServiceReference::new("a.ns1.svc.cluster.local", "ns1")],
            ),
        );
        let right = IstioReferencesMap::single(
            key("ns1", "se1"),
            refs(
                vec![dr_ref("dr2")],
                vec![ServiceReference::new("b.ns1.svc.cluster.local", "ns1")],
            ),
        );

        let merged = left.merge(right);

        assert_eq!(merged.len(), 1);
        let entry = merged.get(&key("ns1", "se1")).unwrap();
        assert_eq!(entry.object_references, vec![dr_ref("dr1"), dr_ref("dr2")]);
        assert_eq!(
            entry.service_references,
            vec![
                ServiceReference::new("a.ns1.svc.cluster.local", "ns1"),
                ServiceReference::new("b.ns1.svc.cluster.local", "ns1"),
            ]
        );
    }

    #[test]
    fn merge_into_empty_map_is_identity() {
        let single = IstioReferencesMap::single(key("ns1", "se1"), refs(vec![dr_ref("dr1")], vec![]));
        let merged = IstioReferencesMap::new().merge(single.clone());
        assert_eq!(merged, single);
    }

    #[test]
    fn merge_with_empty_map_changes_nothing() {
        let single = IstioReferencesMap::single(key("ns1", "se1"), refs(vec![dr_ref("dr1")], vec![]));
        let merged = single.clone().merge(IstioReferencesMap::new());
        assert_eq!(merged, single);
    }

    #[test]
    fn collect_merges_shared_keys() {
        let map: IstioReferencesMap = vec![
            (key("ns1", "se1"), refs(vec![dr_ref("dr1")], vec![])),
            (key("ns2", "se1"), refs(vec![], vec![])),
            (key("ns1", "se1"), refs(vec![dr_ref("dr2")], vec![])),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&key("ns1", "se1")).unwrap().object_references,
            vec![dr_ref("dr1"), dr_ref("dr2")]
        );
    }

    #[test]
    fn keys_iterate_in_order() {
        let map: IstioReferencesMap = vec![
            (key("ns2", "a"), IstioReferences::default()),
            (key("ns1", "b"), IstioReferences::default()),
            (key("ns1", "a"), IstioReferences::default()),
        ]
        .into_iter()
        .collect();

        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "serviceentry/ns1/a",
                "serviceentry/ns1/b",
                "serviceentry/ns2/a"
            ]
        );
    }

    #[test]
    fn empty_references() {
        assert!(IstioReferences::default().is_empty());
        assert!(!refs(vec![dr_ref("dr1")], vec![]).is_empty());
    }

    #[test]
    fn map_serializes_as_flat_entries() {
        let map = IstioReferencesMap::single(
            key("ns1", "se1"),
            refs(
                vec![dr_ref("dr1")],
                vec![ServiceReference::new("foo.ns1.svc.cluster.local", "ns1")],
            ),
        );

        let json = serde_json::to_value(&map).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "namespace": "ns1",
                "name": "se1",
                "objectType": "serviceentry",
                "objectReferences": [
                    {"name": "dr1", "namespace": "ns1", "objectType": "destinationrule"}
                ],
                "serviceReferences": [
                    {"name": "foo.ns1.svc.cluster.local", "namespace": "ns1"}
                ]
            }])
        );
    }
}
