//! Deterministic 24-month financial projection engine for a tiered
//! content-hosting product.
//!
//! A run starts from a validated [`store::AssumptionStore`], projects
//! per-tier unit sales, derives usage and infrastructure cost, builds the
//! income statement, restates it for returns, compares three revenue
//! recognition policies, and rolls everything up into annual figures.
//! Identical stores always produce identical runs.

pub mod aggregate;
pub mod costs;
pub mod display;
pub mod engine;
pub mod error;
pub mod income;
pub mod projection;
pub mod recognition;
pub mod returns;
pub mod series;
pub mod store;
pub mod summary;
pub mod tiers;

pub use engine::{sweep, ModelRun, ScenarioRun};
pub use error::ModelError;
pub use series::{MonthlySeries, Temporality, MONTHS};
pub use store::{AssumptionStore, Scenario};
pub use tiers::{Tier, TierId};
