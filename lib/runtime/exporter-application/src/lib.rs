//! Discovery, probing and reconciliation runtime.

pub mod cycle;
pub mod dispatcher;
pub mod enumerator;
pub mod reconciler;

pub use cycle::{CycleDriver, CycleReport};
pub use dispatcher::{InFlightProbes, ProbeDispatcher};
pub use enumerator::ResourceEnumerator;
pub use reconciler::MetricReconciler;

#[cfg(test)]
mod fakes;
