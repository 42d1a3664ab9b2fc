//! End-to-end ServiceEntry reference resolution from decoded snapshots

use std::thread;

use serde_json::json;

use meshref_common::{
    HostResolver, IstioReference, IstioReferenceKey, IstioReferencesMap, ObjectType,
    ResolverConfig, ResourceSnapshot, ServiceReference,
};
use meshref_references::{ReferenceChecker, ServiceEntryReferences};

// =============================================================================
// Fixtures
// =============================================================================

fn snapshot(value: serde_json::Value) -> ResourceSnapshot {
    ResourceSnapshot::from_json(&value.to_string()).expect("fixture snapshot should decode")
}

fn resolve(snapshot: &ResourceSnapshot) -> IstioReferencesMap {
    ServiceEntryReferences::from_snapshot(snapshot, HostResolver::default()).references()
}

fn se1_key() -> IstioReferenceKey {
    IstioReferenceKey::new("ns1", "se1", ObjectType::ServiceEntry)
}

fn bookinfo() -> ResourceSnapshot {
    snapshot(json!({
        "namespaces": [{"name": "ns1"}, {"name": "ns2"}],
        "serviceEntries": [
            {"metadata": {"name": "se1", "namespace": "ns1"},
             "spec": {"hosts": ["foo.ns1.svc.cluster.local"]}}
        ],
        "destinationRules": [
            {"metadata": {"name": "dr1", "namespace": "ns1"},
             "spec": {"host": "foo.ns1.svc.cluster.local"}},
            {"metadata": {"name": "dr-wildcard", "namespace": "ns1"},
             "spec": {"host": "*.ns1.svc.cluster.local"}}
        ],
        "sidecars": [
            {"metadata": {"name": "sc1", "namespace": "ns1"},
             "spec": {"egress": [{"hosts": ["ns1/foo.ns1.svc.cluster.local"]}]}},
            {"metadata": {"name": "sc-any", "namespace": "ns1"},
             "spec": {"egress": [{"hosts": ["*/foo.ns1.svc.cluster.local"]}]}}
        ],
        "authorizationPolicies": [
            {"metadata": {"name": "ap1", "namespace": "ns2"},
             "spec": {"rules": [{"to": [{"operation": {"hosts": ["foo.ns1"]}}]}]}}
        ],
        "registryServices": [
            {"hostname": "foo.ns1.svc.cluster.local", "namespace": "ns1"},
            {"hostname": "foo.ns1.svc.cluster.local", "namespace": "ns1"}
        ]
    }))
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn resolves_every_reference_kind() {
    let map = resolve(&bookinfo());

    assert_eq!(map.len(), 1);
    let refs = map.get(&se1_key()).expect("se1 should have an entry");
    assert_eq!(
        refs.object_references,
        vec![
            IstioReference::new("dr1", "ns1", ObjectType::DestinationRule),
            IstioReference::new("sc1", "ns1", ObjectType::Sidecar),
            IstioReference::new("ap1", "ns2", ObjectType::AuthorizationPolicy),
        ]
    );
    assert_eq!(
        refs.service_references,
        vec![ServiceReference::new("foo.ns1.svc.cluster.local", "ns1")]
    );
}

#[test]
fn wildcard_and_any_namespace_objects_are_absent() {
    let map = resolve(&bookinfo());
    let refs = map.get(&se1_key()).expect("se1 should have an entry");

    assert!(!refs
        .object_references
        .iter()
        .any(|r| r.name == "dr-wildcard" || r.name == "sc-any"));
}

#[test]
fn distinct_service_entries_keep_their_own_references() {
    let snap = snapshot(json!({
        "serviceEntries": [
            {"metadata": {"name": "se1", "namespace": "ns1"},
             "spec": {"hosts": ["foo.ns1.svc.cluster.local"]}},
            {"metadata": {"name": "se2", "namespace": "ns1"},
             "spec": {"hosts": ["api.example.com"]}}
        ],
        "destinationRules": [
            {"metadata": {"name": "dr-foo", "namespace": "ns1"}, "spec": {"host": "foo"}},
            {"metadata": {"name": "dr-api", "namespace": "ns1"},
             "spec": {"host": "api.example.com"}}
        ]
    }));

    let map = resolve(&snap);

    assert_eq!(map.len(), 2);
    let se2 = IstioReferenceKey::new("ns1", "se2", ObjectType::ServiceEntry);
    assert_eq!(
        map.get(&se1_key()).unwrap().object_references,
        vec![IstioReference::new("dr-foo", "ns1", ObjectType::DestinationRule)]
    );
    assert_eq!(
        map.get(&se2).unwrap().object_references,
        vec![IstioReference::new("dr-api", "ns1", ObjectType::DestinationRule)]
    );
}

#[test]
fn service_entry_without_hosts_gets_empty_entry() {
    let snap = snapshot(json!({
        "serviceEntries": [{"metadata": {"name": "se1", "namespace": "ns1"}}],
        "destinationRules": [
            {"metadata": {"name": "dr1", "namespace": "ns1"}, "spec": {"host": "foo"}}
        ],
        "registryServices": [
            {"hostname": "foo.ns1.svc.cluster.local", "namespace": "ns1"}
        ]
    }));

    let map = resolve(&snap);

    assert!(map.get(&se1_key()).unwrap().is_empty());
}

#[test]
fn custom_identity_domain_changes_short_name_resolution() {
    let snap = snapshot(json!({
        "serviceEntries": [
            {"metadata": {"name": "se1", "namespace": "ns1"},
             "spec": {"hosts": ["foo.ns1.cluster.example", "foo.ns1.svc.cluster.local"]}}
        ],
        "destinationRules": [
            {"metadata": {"name": "dr1", "namespace": "ns1"}, "spec": {"host": "foo"}}
        ]
    }));
    let config = ResolverConfig::from_json(r#"{"identityDomain": "cluster.example"}"#).unwrap();

    let map = ServiceEntryReferences::from_snapshot(&snap, HostResolver::from_config(&config))
        .references();

    // Only the host in the configured domain matches
    assert_eq!(map.get(&se1_key()).unwrap().object_references.len(), 1);
}

#[test]
fn merging_checker_outputs_concatenates_shared_keys() {
    let first = resolve(&bookinfo());
    let second = resolve(&bookinfo());

    let merged = first.clone().merge(second);

    let refs = merged.get(&se1_key()).unwrap();
    let single = first.get(&se1_key()).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(
        refs.object_references.len(),
        2 * single.object_references.len()
    );
    assert_eq!(
        refs.service_references.len(),
        2 * single.service_references.len()
    );
}

#[test]
fn disjoint_snapshots_resolve_in_parallel() {
    let snapshots = vec![bookinfo(), bookinfo(), bookinfo()];

    let maps: Vec<IstioReferencesMap> = thread::scope(|scope| {
        let handles: Vec<_> = snapshots
            .iter()
            .map(|snap| scope.spawn(move || resolve(snap)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("resolver thread panicked"))
            .collect()
    });

    let expected = resolve(&bookinfo());
    assert!(maps.iter().all(|map| *map == expected));
}

#[test]
fn output_serializes_for_consumers() {
    let json = serde_json::to_value(resolve(&bookinfo())).unwrap();

    assert_eq!(json[0]["name"], "se1");
    assert_eq!(json[0]["objectType"], "serviceentry");
    assert_eq!(json[0]["objectReferences"][1]["objectType"], "sidecar");
    assert_eq!(
        json[0]["serviceReferences"],
        json!([{"name": "foo.ns1.svc.cluster.local", "namespace": "ns1"}])
    );
}
