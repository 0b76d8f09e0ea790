//! Prometheus exposition of the `tenant_up` gauge.

pub mod gauge;
pub mod server;

pub use gauge::PrometheusTenantGauge;
pub use server::{bind, router, serve};
