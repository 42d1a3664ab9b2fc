//! Registry service matching
//!
//! Decides whether a service discovered in the mesh registry backs a
//! ServiceEntry host. The namespace scoping rules belong to the mesh, so the
//! predicate is a trait: [`ExportToMatcher`] implements Istio's `exportTo`
//! visibility, and any `Fn(&str, &str, &RegistryService) -> bool` can stand
//! in for it.

use meshref_common::istio::RegistryService;

/// Pure predicate deciding whether `service` backs `host` as seen from
/// `namespace`. Must not depend on call order.
pub trait ServiceMatcher: Send + Sync {
    /// Whether `service` is a backing instance for `host` in `namespace`
    fn matches(&self, namespace: &str, host: &str, service: &RegistryService) -> bool;
}

impl<F> ServiceMatcher for F
where
    F: Fn(&str, &str, &RegistryService) -> bool + Send + Sync,
{
    fn matches(&self, namespace: &str, host: &str, service: &RegistryService) -> bool {
        self(namespace, host, service)
    }
}

/// Matches on exact hostname, then applies `exportTo` visibility.
///
/// A service with no `exportTo` is visible everywhere. Otherwise it is
/// visible when the list contains `*`, the requesting namespace, or `.` and
/// the service lives in the requesting namespace. `~` hides the service.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportToMatcher;

impl ServiceMatcher for ExportToMatcher {
    fn matches(&self, namespace: &str, host: &str, service: &RegistryService) -> bool {
        if service.hostname != host {
            return false;
        }
        if service.export_to.is_empty() {
            return true;
        }
        service.export_to.iter().any(|export| match export.as_str() {
            "*" => true,
            "." => service.namespace == namespace,
            "~" => false,
            ns => ns == namespace,
        })
    }
}
