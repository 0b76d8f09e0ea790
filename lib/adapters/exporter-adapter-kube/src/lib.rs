//! Kubernetes adapters: client bootstrap and routing resource discovery.

pub mod client;
pub mod source;

pub use client::connect;
pub use source::KubeRouteSource;
