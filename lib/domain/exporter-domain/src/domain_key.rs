//! Canonical domain keys derived from routing resource annotations.

use std::collections::BTreeMap;
use std::fmt;

pub const DOMAIN_ANNOTATION: &str = "traefik-ingressroute-exporter/domain";
pub const PATH_ANNOTATION: &str = "traefik-ingressroute-exporter/path";

/// Host plus optional path, as probed and as exported in the `domain` label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainKey(String);

impl DomainKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the domain key for one routing resource.
///
/// Both annotations must be present, otherwise the resource is not probed.
/// The trims run in a fixed order: one trailing `/` off the domain, then a
/// trailing `/*` wildcard off the domain, then one leading `/` off the path.
pub fn extract_domain_key(annotations: &BTreeMap<String, String>) -> Option<DomainKey> {
    let domain = annotations.get(DOMAIN_ANNOTATION)?;
    let path = annotations.get(PATH_ANNOTATION)?;

    let domain = domain.strip_suffix('/').unwrap_or(domain);
    let domain = domain.strip_suffix("/*").unwrap_or(domain);
    let path = path.strip_prefix('/').unwrap_or(path);

    Some(DomainKey(format!("{domain}/{path}")))
}
