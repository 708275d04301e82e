//! Pipeline orchestration: one deterministic run over a validated
//! assumption store, and the three-scenario sweep.
//!
//! Stages execute in a fixed dependency order; each stage consumes the
//! outputs of earlier stages by reference and produces immutable series.
//! Identical stores produce identical runs.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::CrossTier;
use crate::costs::{size_sensitivity, InfraCosts, LifetimeCost, PerUnitCosts, SizePoint};
use crate::error::ModelError;
use crate::income::IncomeStatement;
use crate::projection::{unit_sales, Activity};
use crate::recognition::RecognitionSchedules;
use crate::returns::ReturnsAdjustment;
use crate::series::MonthlySeries;
use crate::store::{validate, AssumptionStore, Scenario};
use crate::summary::{summarize, AnnualFigure};
use crate::tiers::Tier;

/// A complete 24-month projection computed from one assumption store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub tiers: [Tier; 3],
    pub sales: CrossTier,
    pub activity: Activity,
    pub infra: InfraCosts,
    pub income: IncomeStatement,
    pub returns: ReturnsAdjustment,
    pub per_unit: PerUnitCosts,
    pub lifetime_costs: Vec<LifetimeCost>,
    pub size_grid: Vec<SizePoint>,
    pub recognition: RecognitionSchedules,
    /// Annual rollups of the headline series, keyed by series name.
    pub annual: BTreeMap<String, AnnualFigure>,
}

impl ModelRun {
    pub fn compute(store: &AssumptionStore) -> Result<Self, ModelError> {
        validate::validate(store)?;

        let tiers = Tier::all(store)?;
        let sales = CrossTier::combine(unit_sales(&tiers));
        let activity = Activity::derive(store, &sales.total_sold, &sales.cumulative_sold)?;
        let infra = InfraCosts::allocate(store, &activity)?;
        let income = IncomeStatement::build(store, &tiers, &sales, &activity, &infra)?;
        let returns = ReturnsAdjustment::build(store, &sales, &activity, &income)?;
        let per_unit = PerUnitCosts::derive(store)?;
        let lifetime_costs = per_unit.lifetime_table(&tiers);
        let size_grid = size_sensitivity(&per_unit, store)?;
        let recognition =
            RecognitionSchedules::build(store, &tiers, &sales, &income, &returns, &per_unit)?;

        let mut run = Self {
            tiers,
            sales,
            activity,
            infra,
            income,
            returns,
            per_unit,
            lifetime_costs,
            size_grid,
            recognition,
            annual: BTreeMap::new(),
        };
        run.annual = run
            .headline_series()
            .into_iter()
            .map(|s| (s.name().to_string(), summarize(s)))
            .collect();
        Ok(run)
    }

    /// The series a report leads with, in presentation order.
    pub fn headline_series(&self) -> Vec<&MonthlySeries> {
        vec![
            &self.sales.total_sold,
            &self.sales.cumulative_sold,
            &self.activity.active_units,
            &self.activity.content_gb,
            &self.activity.playback_views,
            &self.infra.total_infrastructure,
            &self.income.total_revenue,
            &self.income.total_cogs,
            &self.income.gross_profit,
            &self.income.total_opex,
            &self.income.ebitda,
            &self.income.tax,
            &self.income.net_income,
            &self.income.cumulative_net_income,
            &self.returns.total_impact,
            &self.returns.net_revenue,
            &self.returns.adjusted_ebitda,
            &self.returns.adjusted_net_income,
            &self.recognition.cash_total,
            &self.recognition.hybrid_total,
            &self.recognition.straight_line_total,
            &self.recognition.hybrid_ledger.closing_balance,
            &self.recognition.straight_line_ledger.closing_balance,
            &self.recognition.hosting_obligation,
            &self.recognition.coverage_ratio,
        ]
    }

    /// Every computed series, keyed by name. Names are unique across the
    /// pipeline, so the map has one entry per series.
    pub fn series_map(&self) -> BTreeMap<&str, &MonthlySeries> {
        let mut all: Vec<&MonthlySeries> = Vec::new();
        all.extend(self.sales.per_tier_sold.iter());
        all.extend(self.sales.per_tier_cumulative.iter());
        all.extend([&self.sales.total_sold, &self.sales.cumulative_sold]);
        all.extend([
            &self.activity.active_units,
            &self.activity.new_content_gb,
            &self.activity.content_gb,
            &self.activity.playback_views,
            &self.activity.glyph_calls,
            &self.activity.compute_invocations,
            &self.activity.cdn_class_a_ops,
            &self.activity.cdn_class_b_ops,
            &self.activity.cold_write_ops,
            &self.activity.cold_read_ops,
            &self.activity.table_transactions,
            &self.activity.playback_bandwidth_gb,
        ]);
        all.extend([
            &self.infra.cold_storage_cost,
            &self.infra.cold_write_cost,
            &self.infra.cold_read_cost,
            &self.infra.cold_retrieval_cost,
            &self.infra.cold_total,
            &self.infra.cdn_storage_cost,
            &self.infra.cdn_class_a_cost,
            &self.infra.cdn_class_b_cost,
            &self.infra.cdn_total,
            &self.infra.table_cost,
            &self.infra.compute_cost,
            &self.infra.identity_cost,
            &self.infra.total_infrastructure,
        ]);
        all.extend(self.income.tier_revenue.iter());
        all.extend(self.income.tier_cogs.iter());
        all.extend([
            &self.income.extend_revenue,
            &self.income.upgrade_revenue,
            &self.income.gift_wrap_revenue,
            &self.income.addon_revenue,
            &self.income.total_revenue,
            &self.income.addon_cogs,
            &self.income.total_cogs,
            &self.income.gross_profit,
            &self.income.gross_margin,
            &self.income.marketing,
            &self.income.shipping,
            &self.income.payment_processing,
            &self.income.support,
            &self.income.insurance,
            &self.income.infrastructure,
            &self.income.total_opex,
            &self.income.ebitda,
            &self.income.ebitda_margin,
            &self.income.tax,
            &self.income.net_income,
            &self.income.cumulative_net_income,
            &self.income.cac,
            &self.income.avg_revenue_per_unit,
            &self.income.all_in_cost_per_unit,
            &self.income.infra_cost_per_active_unit,
            &self.income.replicated_storage_gb,
        ]);
        all.extend([
            &self.returns.returned_units,
            &self.returns.pre_claim_returns,
            &self.returns.post_claim_returns,
            &self.returns.replacement_units,
            &self.returns.refunds,
            &self.returns.return_shipping,
            &self.returns.return_processing,
            &self.returns.dead_cogs,
            &self.returns.salvage_credit,
            &self.returns.replacement_cogs,
            &self.returns.replacement_shipping,
            &self.returns.total_impact,
            &self.returns.net_revenue,
            &self.returns.adjusted_cogs,
            &self.returns.returns_overhead,
            &self.returns.adjusted_gross_profit,
            &self.returns.adjusted_gross_margin,
            &self.returns.adjusted_ebitda,
            &self.returns.adjusted_ebitda_margin,
            &self.returns.adjusted_tax,
            &self.returns.adjusted_net_income,
            &self.returns.cumulative_adjusted_net_income,
            &self.returns.net_active_units,
            &self.returns.margin_erosion,
        ]);
        all.extend([
            &self.recognition.cash_tier_revenue,
            &self.recognition.upsell_revenue,
            &self.recognition.cash_total,
            &self.recognition.hybrid_upfront,
            &self.recognition.hybrid_deferred_recognized,
            &self.recognition.hybrid_total,
            &self.recognition.straight_line_recognized,
            &self.recognition.straight_line_total,
            &self.recognition.hybrid_gap,
            &self.recognition.straight_line_gap,
            &self.recognition.hybrid_ledger.new_deferrals,
            &self.recognition.hybrid_ledger.recognized,
            &self.recognition.hybrid_ledger.reversals,
            &self.recognition.hybrid_ledger.closing_balance,
            &self.recognition.straight_line_ledger.new_deferrals,
            &self.recognition.straight_line_ledger.recognized,
            &self.recognition.straight_line_ledger.reversals,
            &self.recognition.straight_line_ledger.closing_balance,
            &self.recognition.cash_ebitda,
            &self.recognition.hybrid_ebitda,
            &self.recognition.straight_line_ebitda,
            &self.recognition.hosting_obligation,
            &self.recognition.coverage_ratio,
        ]);
        all.into_iter().map(|s| (s.name(), s)).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One scenario's label paired with its completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub run: ModelRun,
}

/// Computes every named scenario. Scenarios are independent, so they run
/// in parallel; results come back in canonical scenario order.
pub fn sweep() -> Result<Vec<ScenarioRun>, ModelError> {
    let mut runs = Scenario::ALL
        .par_iter()
        .map(|&scenario| {
            let run = ModelRun::compute(&scenario.store())?;
            Ok(ScenarioRun { scenario, run })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;
    runs.sort_by_key(|r| r.scenario);
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MONTHS;
    use crate::store::keys;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn base_run_is_deterministic() {
        let store = AssumptionStore::base_case();
        let a = ModelRun::compute(&store).unwrap();
        let b = ModelRun::compute(&store).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn annual_rollups_match_their_series() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        let revenue = &run.annual["total_revenue"];
        assert_eq!(revenue.total, run.income.total_revenue.sum());
        assert_eq!(revenue.year1 + revenue.year2, revenue.total);
        // Stocks report year-end levels.
        let cum = &run.annual["cumulative_net_income"];
        assert_eq!(cum.year1, run.income.cumulative_net_income.at(12));
        assert_eq!(cum.total, run.income.cumulative_net_income.at(MONTHS));
    }

    #[test]
    fn recognition_totals_conserve_cash_revenue() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        // What hybrid defers is exactly what cash already recognized.
        for m in 1..=MONTHS {
            assert_eq!(
                run.recognition.cash_total.at(m) - run.recognition.hybrid_total.at(m),
                run.recognition.hybrid_gap.at(m)
            );
        }
    }

    #[test]
    fn sweep_covers_all_scenarios_in_order() {
        let runs = sweep().unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].scenario, Scenario::Conservative);
        assert_eq!(runs[1].scenario, Scenario::Base);
        assert_eq!(runs[2].scenario, Scenario::Optimistic);
    }

    #[test]
    fn scenario_revenue_moves_monotonically() {
        let runs = sweep().unwrap();
        let totals: Vec<Decimal> =
            runs.iter().map(|r| r.run.income.total_revenue.sum()).collect();
        assert!(totals[0] < totals[1]);
        assert!(totals[1] < totals[2]);
    }

    #[test]
    fn invalid_store_is_rejected_before_any_stage_runs() {
        let mut store = AssumptionStore::base_case();
        store.override_value(keys::PRICE_SHORT, dec!(-1));
        let err = ModelRun::compute(&store).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAssumption { .. }));
    }

    #[test]
    fn series_map_has_one_entry_per_series() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        let map = run.series_map();
        // Name collisions would silently drop series from the map.
        assert!(map.len() > 90, "got {}", map.len());
        assert!(map.contains_key("total_revenue"));
        assert!(map.contains_key("hybrid_closing_balance"));
        assert!(map.contains_key("short_units_sold"));
        for series in run.headline_series() {
            assert!(map.contains_key(series.name()), "{}", series.name());
        }
    }

    #[test]
    fn run_serializes_to_json() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        let json = run.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("annual").is_some());
        assert!(value.get("recognition").is_some());
    }
}
