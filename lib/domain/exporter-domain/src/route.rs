use std::collections::BTreeMap;

use crate::domain_key::{DomainKey, extract_domain_key};

/// A routing resource as seen by discovery: identity plus annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteResource {
    pub namespace: String,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
}

impl RouteResource {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        annotations: BTreeMap<String, String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            annotations,
        }
    }

    pub fn domain_key(&self) -> Option<DomainKey> {
        extract_domain_key(&self.annotations)
    }
}
