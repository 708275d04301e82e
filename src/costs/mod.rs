//! Usage & cost allocation: monthly infrastructure cost line items and the
//! volume-independent per-unit steady-state model.

mod infra;
mod per_unit;

pub use infra::{CostDimension, InfraCosts};
pub use per_unit::{
    size_sensitivity, LifetimeCost, MonthlyPerUnit, PerUnitCosts, SetupCosts, SizePoint,
};
