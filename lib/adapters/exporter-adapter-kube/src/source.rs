use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::{Client, ResourceExt};

use exporter_domain::{ResourceConfig, RouteResource};
use exporter_ports::RouteSourcePort;

/// Lists namespaces and annotated routing resources through the cluster API.
#[derive(Clone)]
pub struct KubeRouteSource {
    client: Client,
    resource: ApiResource,
}

impl KubeRouteSource {
    pub fn new(client: Client, resource: &ResourceConfig) -> Self {
        Self {
            client,
            resource: api_resource(resource),
        }
    }
}

pub fn api_resource(resource: &ResourceConfig) -> ApiResource {
    let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
    ApiResource::from_gvk_with_plural(&gvk, &resource.plural)
}

/// Only identity and annotations are kept.
pub fn route_from_object(namespace: &str, object: DynamicObject) -> RouteResource {
    let name = object.name_any();
    let namespace = object
        .metadata
        .namespace
        .unwrap_or_else(|| namespace.to_string());
    RouteResource::new(
        namespace,
        name,
        object.metadata.annotations.unwrap_or_default(),
    )
}

#[async_trait]
impl RouteSourcePort for KubeRouteSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;
        Ok(namespaces.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteResource>> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.resource);
        let objects = api.list(&ListParams::default()).await.with_context(|| {
            format!(
                "Failed to list {} in namespace {}",
                self.resource.plural, namespace
            )
        })?;
        Ok(objects
            .items
            .into_iter()
            .map(|object| route_from_object(namespace, object))
            .collect())
    }
}
