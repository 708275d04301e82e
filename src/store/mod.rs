//! Assumption store: named input parameters, validation, scenarios.

pub mod keys;
mod registry;
mod scenario;
mod types;
pub mod validate;

pub use registry::AssumptionStore;
pub use scenario::Scenario;
pub use types::{Assumption, Unit};
