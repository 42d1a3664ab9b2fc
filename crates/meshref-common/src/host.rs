//! Host resolution for Istio host expressions
//!
//! Istio config kinds encode hosts differently: a DestinationRule may say
//! `reviews`, `reviews.bookinfo` or `reviews.bookinfo.svc.cluster.local`, a
//! Sidecar egress listener says `bookinfo/reviews.bookinfo.svc.cluster.local`,
//! and external names such as `api.example.com` pass through untouched.
//! [`HostResolver`] turns all of them into a [`Host`] whose `Display` form is
//! the canonical FQDN used for equality matching.
//!
//! Resolution is best-effort. Nothing here returns an error: an expression
//! that cannot be understood yields a host that simply never matches.

use std::fmt;

use crate::config::ResolverConfig;
use crate::DEFAULT_IDENTITY_DOMAIN;

/// A parsed host.
///
/// `namespace` and `cluster` are empty for external or unparseable names, in
/// which case the whole input is kept in `service`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Host {
    /// Service short name, or the full input for external names
    pub service: String,
    /// Service namespace
    pub namespace: String,
    /// Cluster identity domain (e.g., "svc.cluster.local")
    pub cluster: String,
    /// Whether the input carried enough information to build an FQDN
    pub complete_input: bool,
}

impl Host {
    /// Whether this host is a wildcard and must never be used as an exact match
    pub fn is_wildcard(&self) -> bool {
        self.service.starts_with('*')
    }

    /// Canonical form compared against ServiceEntry hosts
    pub fn fqdn(&self) -> String {
        self.to_string()
    }

    fn external(host_name: &str) -> Self {
        Self {
            service: host_name.to_string(),
            namespace: String::new(),
            cluster: String::new(),
            complete_input: false,
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.service)?;
        if !self.namespace.is_empty() {
            write!(f, ".{}", self.namespace)?;
        }
        if !self.cluster.is_empty() {
            write!(f, ".{}", self.cluster)?;
        }
        Ok(())
    }
}

/// Resolves host expressions against a cluster identity domain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostResolver {
    identity_domain: String,
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_DOMAIN)
    }
}

impl HostResolver {
    /// Create a resolver for the given identity domain
    pub fn new(identity_domain: impl Into<String>) -> Self {
        Self {
            identity_domain: identity_domain.into(),
        }
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.identity_domain.clone())
    }

    /// Identity domain used when an object does not name its cluster
    pub fn identity_domain(&self) -> &str {
        &self.identity_domain
    }

    fn cluster_or_default<'a>(&'a self, cluster: &'a str) -> &'a str {
        if cluster.is_empty() {
            &self.identity_domain
        } else {
            cluster
        }
    }

    /// Parse a simple or fully-qualified host name.
    ///
    /// - `reviews` resolves inside `namespace`
    /// - `reviews.bookinfo.<cluster>` is taken as an FQDN
    /// - anything else is an external name and is kept verbatim
    pub fn parse_host(&self, host_name: &str, namespace: &str, cluster: &str) -> Host {
        let cluster = self.cluster_or_default(cluster);
        let mut labels = host_name.splitn(3, '.');
        let service = labels.next().unwrap_or_default();

        match (labels.next(), labels.next()) {
            (None, _) => Host {
                service: service.to_string(),
                namespace: namespace.to_string(),
                cluster: cluster.to_string(),
                complete_input: true,
            },
            (Some(host_namespace), Some(domain)) if domain == cluster => Host {
                service: service.to_string(),
                namespace: host_namespace.to_string(),
                cluster: cluster.to_string(),
                complete_input: true,
            },
            _ => Host::external(host_name),
        }
    }

    /// Parse a host name, treating `service.namespace` as namespace-qualified
    /// when the namespace is the owning one or visible in the cluster.
    ///
    /// Without that check a two-label name is indistinguishable from an
    /// external domain such as `example.com`.
    pub fn get_host(
        &self,
        host_name: &str,
        namespace: &str,
        cluster: &str,
        visible_namespaces: &[String],
    ) -> Host {
        if let Some((service, host_namespace)) = host_name.split_once('.') {
            let qualified = !host_namespace.contains('.')
                && (host_namespace == namespace
                    || visible_namespaces.iter().any(|ns| ns == host_namespace));
            if qualified {
                return Host {
                    service: service.to_string(),
                    namespace: host_namespace.to_string(),
                    cluster: self.cluster_or_default(cluster).to_string(),
                    complete_input: true,
                };
            }
        }
        self.parse_host(host_name, namespace, cluster)
    }
}

/// A Sidecar egress host expression: `namespace/dnsName`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidecarHost<'a> {
    /// Namespace component (`*`, `~`, `.` or a namespace name)
    pub namespace: &'a str,
    /// DNS name component (`*` or a host name)
    pub dns_name: &'a str,
}

impl<'a> SidecarHost<'a> {
    /// Split an egress host on its first `/`.
    ///
    /// Returns `None` when the separator is missing.
    pub fn parse(expr: &'a str) -> Option<Self> {
        let (namespace, dns_name) = expr.split_once('/')?;
        Some(Self {
            namespace,
            dns_name,
        })
    }

    /// Whether the expression stands for a set of hosts rather than one.
    ///
    /// `*` (any namespace), `~` (no namespace), `.` (the Sidecar's own
    /// namespace) and a `*` DNS name cannot be confirmed against a single
    /// ServiceEntry host.
    pub fn is_unmatchable(&self) -> bool {
        matches!(self.namespace, "*" | "~" | ".") || self.dns_name == "*"
    }
}
