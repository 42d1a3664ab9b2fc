//! ServiceEntry reference resolution
//!
//! For every ServiceEntry, four passes run against the snapshot:
//!
//! 1. DestinationRules whose host resolves to one of the entry's hosts
//! 2. Sidecars with an egress host `<entry namespace>/<entry host>`
//! 3. AuthorizationPolicies naming one of the entry's hosts in `to.operation.hosts`
//! 4. Registry services backing one of the entry's hosts
//!
//! Object references are not deduplicated. A DestinationRule or
//! AuthorizationPolicy is recorded once per matching (rule host, entry host)
//! pair, while a Sidecar egress host stops at its first matching entry host.
//! Service references are deduplicated by (hostname, namespace).

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use meshref_common::istio::{
    AuthorizationPolicy, DestinationRule, RegistryService, ServiceEntry, Sidecar,
};
use meshref_common::{
    HostResolver, IstioObject, IstioReference, IstioReferences, IstioReferencesMap, Namespaces,
    ResourceSnapshot, ServiceReference, SidecarHost,
};

use crate::registry::{ExportToMatcher, ServiceMatcher};
use crate::ReferenceChecker;

/// Resolves references for a set of ServiceEntries against borrowed config.
#[derive(Clone, Debug)]
pub struct ServiceEntryReferences<'a, M = ExportToMatcher> {
    /// Host resolver (identity domain)
    pub resolver: HostResolver,
    /// Registry service predicate
    pub matcher: M,
    /// Namespaces visible in this scope
    pub namespaces: &'a Namespaces,
    /// ServiceEntries whose references are resolved
    pub service_entries: &'a [ServiceEntry],
    /// DestinationRules
    pub destination_rules: &'a [DestinationRule],
    /// Sidecars
    pub sidecars: &'a [Sidecar],
    /// AuthorizationPolicies
    pub authorization_policies: &'a [AuthorizationPolicy],
    /// Services discovered in the mesh registry
    pub registry_services: &'a [RegistryService],
}

impl<'a> ServiceEntryReferences<'a, ExportToMatcher> {
    /// Borrow every collection from a snapshot, matching registry services
    /// with `exportTo` visibility
    pub fn from_snapshot(snapshot: &'a ResourceSnapshot, resolver: HostResolver) -> Self {
        Self {
            resolver,
            matcher: ExportToMatcher,
            namespaces: &snapshot.namespaces,
            service_entries: &snapshot.service_entries,
            destination_rules: &snapshot.destination_rules,
            sidecars: &snapshot.sidecars,
            authorization_policies: &snapshot.authorization_policies,
            registry_services: &snapshot.registry_services,
        }
    }
}

impl<'a, M: ServiceMatcher> ServiceEntryReferences<'a, M> {
    /// Replace the registry service predicate
    pub fn with_matcher<N: ServiceMatcher>(self, matcher: N) -> ServiceEntryReferences<'a, N> {
        ServiceEntryReferences {
            resolver: self.resolver,
            matcher,
            namespaces: self.namespaces,
            service_entries: self.service_entries,
            destination_rules: self.destination_rules,
            sidecars: self.sidecars,
            authorization_policies: self.authorization_policies,
            registry_services: self.registry_services,
        }
    }

    /// Run all four passes for one ServiceEntry.
    ///
    /// `visible_namespaces` is the name list used to recognise `svc.ns`
    /// shorthand; [`references`](ReferenceChecker::references) computes it
    /// once per pass.
    pub fn extract(&self, se: &ServiceEntry, visible_namespaces: &[String]) -> IstioReferences {
        let mut object_references = self.destination_rule_references(se, visible_namespaces);
        object_references.extend(self.sidecar_references(se));
        object_references.extend(self.authorization_policy_references(se, visible_namespaces));

        IstioReferences::new(object_references, self.service_references(se))
    }

    /// DestinationRules whose host resolves to one of the entry's hosts
    pub fn destination_rule_references(
        &self,
        se: &ServiceEntry,
        visible_namespaces: &[String],
    ) -> Vec<IstioReference> {
        let mut result = Vec::new();
        for dr in self.destination_rules {
            let meta = &dr.metadata;
            let host = self.resolver.get_host(
                &dr.spec.host,
                &meta.namespace,
                &meta.cluster_name,
                visible_namespaces,
            );
            if host.is_wildcard() {
                trace!(destination_rule = %meta.name, host = %dr.spec.host, "skipping wildcard host");
                continue;
            }
            let fqdn = host.to_string();
            for se_host in &se.spec.hosts {
                if *se_host == fqdn {
                    result.push(dr.reference());
                }
            }
        }
        result
    }

    /// Sidecars whose egress hosts name the entry's namespace and one of its
    /// hosts. Each egress host contributes at most one reference.
    pub fn sidecar_references(&self, se: &ServiceEntry) -> Vec<IstioReference> {
        let mut result = Vec::new();
        for sc in self.sidecars {
            for expr in sc.egress_hosts() {
                let Some(egress) = SidecarHost::parse(expr) else {
                    trace!(sidecar = %sc.metadata.name, host = %expr, "skipping malformed egress host");
                    continue;
                };
                if egress.is_unmatchable() || egress.namespace != se.metadata.namespace {
                    continue;
                }
                let host = self.resolver.parse_host(
                    egress.dns_name,
                    egress.namespace,
                    &sc.metadata.cluster_name,
                );
                if host.is_wildcard() {
                    continue;
                }
                if se.has_host(&host.to_string()) {
                    result.push(sc.reference());
                }
            }
        }
        result
    }

    /// AuthorizationPolicies naming one of the entry's hosts in an operation.
    /// Every matching (policy host, entry host) pair adds a reference.
    pub fn authorization_policy_references(
        &self,
        se: &ServiceEntry,
        visible_namespaces: &[String],
    ) -> Vec<IstioReference> {
        let mut result = Vec::new();
        for ap in self.authorization_policies {
            let meta = &ap.metadata;
            for hosts in ap.operation_hosts() {
                for policy_host in hosts {
                    let host = self.resolver.get_host(
                        policy_host,
                        &meta.namespace,
                        &meta.cluster_name,
                        visible_namespaces,
                    );
                    if host.is_wildcard() {
                        continue;
                    }
                    let fqdn = host.to_string();
                    for se_host in &se.spec.hosts {
                        if *se_host == fqdn {
                            result.push(ap.reference());
                        }
                    }
                }
            }
        }
        result
    }

    /// Registry services backing the entry's hosts, deduplicated by
    /// (hostname, namespace) in first-seen order
    pub fn service_references(&self, se: &ServiceEntry) -> Vec<ServiceReference> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for se_host in &se.spec.hosts {
            for service in self.registry_services {
                if !self
                    .matcher
                    .matches(&se.metadata.namespace, se_host, service)
                {
                    continue;
                }
                let reference = service.reference();
                if seen.insert(reference.clone()) {
                    result.push(reference);
                }
            }
        }
        result
    }
}

impl<M: ServiceMatcher> ReferenceChecker for ServiceEntryReferences<'_, M> {
    #[instrument(skip_all, fields(service_entries = self.service_entries.len()))]
    fn references(&self) -> IstioReferencesMap {
        let visible_namespaces = self.namespaces.names();

        self.service_entries
            .iter()
            .fold(IstioReferencesMap::new(), |result, se| {
                let key = se.reference_key();
                let references = self.extract(se, &visible_namespaces);
                debug!(
                    service_entry = %key,
                    object_references = references.object_references.len(),
                    service_references = references.service_references.len(),
                    "resolved service entry references"
                );
                result.merge(IstioReferencesMap::single(key, references))
            })
    }
}
