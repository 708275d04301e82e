//! Monthly infrastructure cost allocation across the five cost dimensions.
//!
//! Each dimension applies its own free-tier allowance independently;
//! storage, write ops and read ops never share a pool. Usage series are
//! rejected outright if any month is negative; the allocator must never
//! silently produce negative cost.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::projection::{weighted_content_mb, Activity};
use crate::series::{MonthlySeries, Temporality};
use crate::store::{keys, AssumptionStore};

const PER_10K: Decimal = dec!(10000);
const PER_1M: Decimal = dec!(1000000);
const MB_PER_GB: Decimal = dec!(1024);
const KB_PER_GB: Decimal = dec!(1048576);
const MS_PER_S: Decimal = dec!(1000);

/// The five independent, additively-combined cost dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostDimension {
    CdnStorage,
    ColdStorage,
    TableStorage,
    Compute,
    Identity,
}

/// `rate * max(0, usage - allowance)`, the free-tier form every metered
/// dimension reduces to. A zero allowance meters from the first unit.
fn metered(usage: Decimal, allowance: Decimal, rate: Decimal) -> Decimal {
    (usage - allowance).max(Decimal::ZERO) * rate
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraCosts {
    pub cold_storage_cost: MonthlySeries,
    pub cold_write_cost: MonthlySeries,
    pub cold_read_cost: MonthlySeries,
    pub cold_retrieval_cost: MonthlySeries,
    pub cold_total: MonthlySeries,
    pub cdn_storage_cost: MonthlySeries,
    pub cdn_class_a_cost: MonthlySeries,
    pub cdn_class_b_cost: MonthlySeries,
    pub cdn_total: MonthlySeries,
    pub table_cost: MonthlySeries,
    pub compute_cost: MonthlySeries,
    pub identity_cost: MonthlySeries,
    pub total_infrastructure: MonthlySeries,
}

impl InfraCosts {
    pub fn allocate(store: &AssumptionStore, activity: &Activity) -> Result<Self, ModelError> {
        for usage in activity.usage_series() {
            usage.ensure_non_negative()?;
        }

        let avg_mb = weighted_content_mb(store)?;

        // Cold storage: the backup mirror holds the full content volume
        // and has no free tier.
        // Billed monthly on the stored level, so the cost itself is a flow.
        let cold_rate = store.get(keys::COLD_STORAGE_RATE_GB)?;
        let cold_storage_cost =
            MonthlySeries::from_fn("cold_storage_cost", Temporality::Flow, |m| {
                activity.content_gb.at(m) * cold_rate
            });
        let cold_write_rate = store.get(keys::COLD_WRITE_RATE_10K)?;
        let cold_write_cost = activity
            .cold_write_ops
            .map("cold_write_cost", |ops| ops / PER_10K * cold_write_rate);
        let cold_read_rate = store.get(keys::COLD_READ_RATE_10K)?;
        let cold_read_cost = activity
            .cold_read_ops
            .map("cold_read_cost", |ops| ops / PER_10K * cold_read_rate);
        let retrieval_rate = store.get(keys::COLD_RETRIEVAL_RATE_GB)?;
        let cold_retrieval_cost = activity
            .cold_read_ops
            .map("cold_retrieval_cost", |ops| ops * avg_mb / MB_PER_GB * retrieval_rate);
        let cold_total = crate::series::sum_all(
            "cold_total",
            &[&cold_storage_cost, &cold_write_cost, &cold_read_cost, &cold_retrieval_cost],
        );

        // CDN: storage and both op classes each carry their own allowance.
        let cdn_storage_rate = store.get(keys::CDN_STORAGE_RATE_GB)?;
        let cdn_free_gb = store.get(keys::CDN_FREE_STORAGE_GB)?;
        let cdn_storage_cost =
            MonthlySeries::from_fn("cdn_storage_cost", Temporality::Flow, |m| {
                metered(activity.content_gb.at(m), cdn_free_gb, cdn_storage_rate)
            });
        let class_a_rate = store.get(keys::CDN_CLASS_A_RATE_1M)?;
        let free_class_a = store.get(keys::CDN_FREE_CLASS_A)?;
        let cdn_class_a_cost = activity
            .cdn_class_a_ops
            .map("cdn_class_a_cost", |ops| metered(ops, free_class_a, class_a_rate / PER_1M));
        let class_b_rate = store.get(keys::CDN_CLASS_B_RATE_1M)?;
        let free_class_b = store.get(keys::CDN_FREE_CLASS_B)?;
        let cdn_class_b_cost = activity
            .cdn_class_b_ops
            .map("cdn_class_b_cost", |ops| metered(ops, free_class_b, class_b_rate / PER_1M));
        let cdn_total = crate::series::sum_all(
            "cdn_total",
            &[&cdn_storage_cost, &cdn_class_a_cost, &cdn_class_b_cost],
        );

        // Table storage: entity bytes for the active base plus transactions.
        let entity_kb = store.get(keys::TABLE_ENTITY_KB)?;
        let table_storage_rate = store.get(keys::TABLE_STORAGE_RATE_GB)?;
        let txn_rate = store.get(keys::TABLE_TXN_RATE_10K)?;
        let table_cost = crate::series::zip(
            "table_cost",
            Temporality::Flow,
            &activity.active_units,
            &activity.table_transactions,
            |active, txns| {
                active * entity_kb / KB_PER_GB * table_storage_rate + txns / PER_10K * txn_rate
            },
        );

        // Compute: executions and GB-seconds metered past separate free tiers.
        let exec_rate = store.get(keys::COMPUTE_EXEC_RATE_1M)?;
        let free_exec = store.get(keys::COMPUTE_FREE_EXECUTIONS)?;
        let gbs_rate = store.get(keys::COMPUTE_GBS_RATE)?;
        let free_gbs = store.get(keys::COMPUTE_FREE_GB_SECONDS)?;
        let duration_s = store.get(keys::COMPUTE_DURATION_MS)? / MS_PER_S;
        let memory_gb = store.get(keys::COMPUTE_MEMORY_MB)? / MB_PER_GB;
        let compute_cost = activity.compute_invocations.map("compute_cost", |inv| {
            metered(inv, free_exec, exec_rate / PER_1M)
                + metered(inv * duration_s * memory_gb, free_gbs, gbs_rate)
        });

        // Identity plus fixed platform costs.
        let identity_base = store.get(keys::IDENTITY_BASE_COST)?;
        let mau_rate = store.get(keys::IDENTITY_MAU_RATE)?;
        let free_mau = store.get(keys::IDENTITY_FREE_MAU)?;
        let mau_per_unit = store.get(keys::MAU_PER_ACTIVE_UNIT)?;
        let fixed = store.get(keys::DOMAIN_MONTHLY_COST)? + store.get(keys::MONITORING_MONTHLY_COST)?;
        let identity_cost = MonthlySeries::from_fn("identity_cost", Temporality::Flow, |m| {
            let active = activity.active_units.at(m);
            identity_base + metered(active * mau_per_unit, free_mau, mau_rate) + fixed
        });

        let total_infrastructure = crate::series::sum_all(
            "total_infrastructure",
            &[&cold_total, &cdn_total, &table_cost, &compute_cost, &identity_cost],
        );

        Ok(Self {
            cold_storage_cost,
            cold_write_cost,
            cold_read_cost,
            cold_retrieval_cost,
            cold_total,
            cdn_storage_cost,
            cdn_class_a_cost,
            cdn_class_b_cost,
            cdn_total,
            table_cost,
            compute_cost,
            identity_cost,
            total_infrastructure,
        })
    }

    /// The five additively-combined cost line items.
    pub fn line_items(&self) -> [(CostDimension, &MonthlySeries); 5] {
        [
            (CostDimension::CdnStorage, &self.cdn_total),
            (CostDimension::ColdStorage, &self.cold_total),
            (CostDimension::TableStorage, &self.table_cost),
            (CostDimension::Compute, &self.compute_cost),
            (CostDimension::Identity, &self.identity_cost),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CrossTier;
    use crate::projection::unit_sales;
    use crate::series::{MonthlySeries, MONTHS};
    use crate::tiers::Tier;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(25), dec!(0.225))] // 0.015 * (25 - 10)
    #[case(dec!(10), Decimal::ZERO)]
    #[case(dec!(3), Decimal::ZERO)]
    fn free_tier_applies_per_dimension(#[case] usage: Decimal, #[case] expected: Decimal) {
        assert_eq!(metered(usage, dec!(10), dec!(0.015)), expected);
    }

    fn base_activity() -> (AssumptionStore, Activity) {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        let agg = CrossTier::combine(unit_sales(&tiers));
        let activity = Activity::derive(&store, &agg.total_sold, &agg.cumulative_sold).unwrap();
        (store, activity)
    }

    #[test]
    fn total_is_sum_of_line_items() {
        let (store, activity) = base_activity();
        let infra = InfraCosts::allocate(&store, &activity).unwrap();
        for m in 1..=MONTHS {
            let sum: Decimal = infra.line_items().iter().map(|(_, s)| s.at(m)).sum();
            assert_eq!(infra.total_infrastructure.at(m), sum);
        }
    }

    #[test]
    fn negative_usage_rejects_the_run() {
        let (store, mut activity) = base_activity();
        let mut values = *activity.cold_read_ops.values();
        values[3] = dec!(-5);
        activity.cold_read_ops = MonthlySeries::flow("cold_read_ops", values);
        let err = InfraCosts::allocate(&store, &activity).unwrap_err();
        assert_eq!(
            err,
            ModelError::NegativeUsage { metric: "cold_read_ops".into(), month: 4 }
        );
    }

    #[test]
    fn early_months_ride_the_free_tiers() {
        let (store, activity) = base_activity();
        let infra = InfraCosts::allocate(&store, &activity).unwrap();
        // Month 1 volumes sit far below the CDN op allowances.
        assert_eq!(infra.cdn_class_a_cost.at(1), Decimal::ZERO);
        assert_eq!(infra.cdn_class_b_cost.at(1), Decimal::ZERO);
        // But cold storage has no allowance and bills from the first GB.
        assert!(infra.cold_storage_cost.at(1) > Decimal::ZERO);
    }
}
