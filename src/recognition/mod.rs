//! Revenue recognition under three policies: full cash at sale, a hybrid
//! split (fulfillment margin upfront, hosting value amortized), and full
//! straight-line amortization over each tier's service lifetime.
//!
//! Add-on revenue carries no future obligation and is recognized
//! immediately under every policy.

mod ledger;

pub use ledger::DeferredLedger;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::CrossTier;
use crate::costs::PerUnitCosts;
use crate::error::ModelError;
use crate::income::IncomeStatement;
use crate::returns::ReturnsAdjustment;
use crate::series::{ratio_or_zero, zip, MonthlySeries, Temporality};
use crate::store::{keys, AssumptionStore};
use crate::tiers::{Tier, TierId};

/// Per-tier decomposition of the retail price into the portion earned at
/// sale and the portion owed as future hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSplit {
    pub tier: TierId,
    /// Fulfillment cost recovered at sale: COGS, outbound shipping,
    /// payment processing, one-time platform setup.
    pub upfront: Decimal,
    pub deferred: Decimal,
    pub hybrid_monthly: Decimal,
    pub straight_line_monthly: Decimal,
}

impl TierSplit {
    fn derive(
        store: &AssumptionStore,
        tier: &Tier,
        setup_total: Decimal,
    ) -> Result<Self, ModelError> {
        let upfront = tier.unit_cost
            + store.get(keys::SHIPPING_COST_PER_UNIT)?
            + tier.unit_price * store.get(keys::PAYMENT_PROCESSING_RATE)?
            + setup_total;
        let deferred = tier.unit_price - upfront;
        Ok(Self {
            tier: tier.id,
            upfront,
            deferred,
            hybrid_monthly: deferred / tier.lifetime_months,
            straight_line_monthly: tier.unit_price / tier.lifetime_months,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSchedules {
    pub tier_splits: [TierSplit; 3],
    pub cash_tier_revenue: MonthlySeries,
    /// Add-on revenue, identical under every policy.
    pub upsell_revenue: MonthlySeries,
    pub cash_total: MonthlySeries,
    pub hybrid_upfront: MonthlySeries,
    pub hybrid_deferred_recognized: MonthlySeries,
    pub hybrid_total: MonthlySeries,
    pub straight_line_recognized: MonthlySeries,
    pub straight_line_total: MonthlySeries,
    pub hybrid_gap: MonthlySeries,
    pub straight_line_gap: MonthlySeries,
    pub hybrid_ledger: DeferredLedger,
    pub straight_line_ledger: DeferredLedger,
    pub cash_ebitda: MonthlySeries,
    pub hybrid_ebitda: MonthlySeries,
    pub straight_line_ebitda: MonthlySeries,
    /// Undiscounted remaining hosting cost owed to every unit ever sold.
    pub hosting_obligation: MonthlySeries,
    /// Hybrid deferred balance over the hosting obligation.
    pub coverage_ratio: MonthlySeries,
}

impl RecognitionSchedules {
    pub fn build(
        store: &AssumptionStore,
        tiers: &[Tier; 3],
        agg: &CrossTier,
        income: &IncomeStatement,
        returns: &ReturnsAdjustment,
        per_unit: &PerUnitCosts,
    ) -> Result<Self, ModelError> {
        let tier_splits = [
            TierSplit::derive(store, &tiers[0], per_unit.setup.total)?,
            TierSplit::derive(store, &tiers[1], per_unit.setup.total)?,
            TierSplit::derive(store, &tiers[2], per_unit.setup.total)?,
        ];

        let per_tier = |name: &str, f: &dyn Fn(usize, usize) -> Decimal| {
            MonthlySeries::from_fn(name, Temporality::Flow, |m| {
                (0..3).map(|t| f(t, m)).sum()
            })
        };

        let cash_tier_revenue = per_tier("cash_tier_revenue", &|t, m| {
            agg.per_tier_sold[t].at(m) * tiers[t].unit_price
        });
        let upsell_revenue = income.addon_revenue.map("upsell_revenue", |v| v);
        let cash_total = zip(
            "cash_total_recognized",
            Temporality::Flow,
            &cash_tier_revenue,
            &upsell_revenue,
            |a, b| a + b,
        );

        let hybrid_upfront = per_tier("hybrid_upfront_recognized", &|t, m| {
            agg.per_tier_sold[t].at(m) * tier_splits[t].upfront
        });
        let hybrid_deferred_recognized = per_tier("hybrid_deferred_recognized", &|t, m| {
            agg.per_tier_cumulative[t].at(m) * tier_splits[t].hybrid_monthly
        });
        let hybrid_total = crate::series::sum_all(
            "hybrid_total_recognized",
            &[&hybrid_upfront, &hybrid_deferred_recognized, &upsell_revenue],
        );

        let straight_line_recognized = per_tier("straight_line_recognized", &|t, m| {
            agg.per_tier_cumulative[t].at(m) * tier_splits[t].straight_line_monthly
        });
        let straight_line_total = zip(
            "straight_line_total_recognized",
            Temporality::Flow,
            &straight_line_recognized,
            &upsell_revenue,
            |a, b| a + b,
        );

        let hybrid_gap = zip(
            "hybrid_recognition_gap",
            Temporality::Flow,
            &cash_total,
            &hybrid_total,
            |c, h| c - h,
        );
        let straight_line_gap = zip(
            "straight_line_recognition_gap",
            Temporality::Flow,
            &cash_total,
            &straight_line_total,
            |c, s| c - s,
        );

        // Return reversals claw deferrals back in proportion to the current
        // month's deferral per unit sold, an approximation that treats the
        // returned cohort as priced like the selling cohort.
        let hybrid_new = per_tier("hybrid_new_deferrals", &|t, m| {
            agg.per_tier_sold[t].at(m) * tier_splits[t].deferred
        });
        let straight_line_new = per_tier("straight_line_new_deferrals", &|t, m| {
            agg.per_tier_sold[t].at(m) * tiers[t].unit_price
        });
        let reversal_request = |new: &MonthlySeries| {
            MonthlySeries::from_fn("requested_reversals", Temporality::Flow, |m| {
                returns.returned_units.at(m)
                    * ratio_or_zero(new.at(m), agg.total_sold.at(m))
            })
        };
        let hybrid_ledger = DeferredLedger::roll_forward(
            "hybrid",
            hybrid_new.map("hybrid_new_deferrals", |v| v),
            hybrid_deferred_recognized.map("hybrid_recognized", |v| v),
            &reversal_request(&hybrid_new),
        );
        let straight_line_ledger = DeferredLedger::roll_forward(
            "straight_line",
            straight_line_new.map("straight_line_new_deferrals", |v| v),
            straight_line_recognized.map("straight_line_amortized", |v| v),
            &reversal_request(&straight_line_new),
        );

        // The cost base is identical under every policy; only the revenue
        // line moves.
        let adjusted_total_costs =
            MonthlySeries::from_fn("adjusted_total_costs", Temporality::Flow, |m| {
                returns.adjusted_cogs.at(m)
                    + returns.returns_overhead.at(m)
                    + income.total_opex.at(m)
            });
        let cash_ebitda = zip(
            "cash_basis_ebitda",
            Temporality::Flow,
            &returns.net_revenue,
            &adjusted_total_costs,
            |r, c| r - c,
        );
        let hybrid_ebitda = MonthlySeries::from_fn("hybrid_ebitda", Temporality::Flow, |m| {
            hybrid_total.at(m) - returns.refunds.at(m) - adjusted_total_costs.at(m)
        });
        let straight_line_ebitda =
            MonthlySeries::from_fn("straight_line_ebitda", Temporality::Flow, |m| {
                straight_line_total.at(m) - returns.refunds.at(m) - adjusted_total_costs.at(m)
            });

        let monthly_cost = per_unit.monthly.total;
        let hosting_obligation =
            MonthlySeries::from_fn("hosting_obligation", Temporality::Stock, |m| {
                (0..3)
                    .map(|t| {
                        agg.per_tier_cumulative[t].at(m)
                            * monthly_cost
                            * tiers[t].lifetime_months
                    })
                    .sum()
            });
        let coverage_ratio = zip(
            "deferred_coverage_ratio",
            Temporality::Stock,
            &hybrid_ledger.closing_balance,
            &hosting_obligation,
            ratio_or_zero,
        );

        Ok(Self {
            tier_splits,
            cash_tier_revenue,
            upsell_revenue,
            cash_total,
            hybrid_upfront,
            hybrid_deferred_recognized,
            hybrid_total,
            straight_line_recognized,
            straight_line_total,
            hybrid_gap,
            straight_line_gap,
            hybrid_ledger,
            straight_line_ledger,
            cash_ebitda,
            hybrid_ebitda,
            straight_line_ebitda,
            hosting_obligation,
            coverage_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::InfraCosts;
    use crate::projection::{unit_sales, Activity};
    use crate::series::MONTHS;
    use rust_decimal_macros::dec;

    fn build() -> (AssumptionStore, CrossTier, IncomeStatement, RecognitionSchedules) {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        let agg = CrossTier::combine(unit_sales(&tiers));
        let activity = Activity::derive(&store, &agg.total_sold, &agg.cumulative_sold).unwrap();
        let infra = InfraCosts::allocate(&store, &activity).unwrap();
        let income = IncomeStatement::build(&store, &tiers, &agg, &activity, &infra).unwrap();
        let returns = ReturnsAdjustment::build(&store, &agg, &activity, &income).unwrap();
        let per_unit = PerUnitCosts::derive(&store).unwrap();
        let rec =
            RecognitionSchedules::build(&store, &tiers, &agg, &income, &returns, &per_unit)
                .unwrap();
        (store, agg, income, rec)
    }

    #[test]
    fn split_partitions_the_retail_price() {
        let (store, _, _, rec) = build();
        let tiers = Tier::all(&store).unwrap();
        for (split, tier) in rec.tier_splits.iter().zip(&tiers) {
            assert_eq!(split.upfront + split.deferred, tier.unit_price);
            assert_eq!(split.hybrid_monthly * tier.lifetime_months, split.deferred);
        }
    }

    #[test]
    fn cash_total_matches_income_statement_revenue() {
        let (_, _, income, rec) = build();
        for m in 1..=MONTHS {
            assert_eq!(rec.cash_total.at(m), income.total_revenue.at(m));
        }
    }

    #[test]
    fn upsell_recognized_identically_under_every_policy() {
        let (_, agg, _, rec) = build();
        // Strip the upsell line from each schedule; what remains must be
        // attributable to tier units alone.
        for m in 1..=MONTHS {
            assert_eq!(
                rec.cash_total.at(m) - rec.upsell_revenue.at(m),
                rec.cash_tier_revenue.at(m)
            );
            assert_eq!(
                rec.hybrid_total.at(m) - rec.upsell_revenue.at(m),
                rec.hybrid_upfront.at(m) + rec.hybrid_deferred_recognized.at(m)
            );
            assert_eq!(
                rec.straight_line_total.at(m) - rec.upsell_revenue.at(m),
                rec.straight_line_recognized.at(m)
            );
        }
        assert!(agg.total_sold.at(1) > Decimal::ZERO);
    }

    #[test]
    fn cash_recognizes_ahead_of_amortizing_policies() {
        let (_, _, _, rec) = build();
        // While sales grow, the cash basis front-loads revenue, so both
        // gaps stay positive throughout the horizon.
        for m in 1..=MONTHS {
            assert!(rec.hybrid_gap.at(m) > Decimal::ZERO);
            assert!(rec.straight_line_gap.at(m) > Decimal::ZERO);
        }
    }

    #[test]
    fn ledger_identity_holds_for_both_policies() {
        let (_, _, _, rec) = build();
        for ledger in [&rec.hybrid_ledger, &rec.straight_line_ledger] {
            let mut prev = Decimal::ZERO;
            for m in 1..=MONTHS {
                let expected = prev + ledger.new_deferrals.at(m)
                    - ledger.recognized.at(m)
                    - ledger.reversals.at(m);
                assert_eq!(ledger.closing_balance.at(m), expected);
                assert!(ledger.closing_balance.at(m) >= Decimal::ZERO);
                prev = ledger.closing_balance.at(m);
            }
        }
    }

    #[test]
    fn ledger_conserves_deferrals_over_the_horizon() {
        let (_, _, _, rec) = build();
        // Everything deferred is either recognized, reversed, or still on
        // the closing balance at month 24.
        for ledger in [&rec.hybrid_ledger, &rec.straight_line_ledger] {
            assert_eq!(
                ledger.new_deferrals.sum(),
                ledger.recognized.sum()
                    + ledger.reversals.sum()
                    + ledger.closing_balance.at(MONTHS)
            );
        }
    }

    #[test]
    fn straight_line_rate_is_price_over_lifetime() {
        let (store, _, _, rec) = build();
        let tiers = Tier::all(&store).unwrap();
        for (split, tier) in rec.tier_splits.iter().zip(&tiers) {
            assert_eq!(
                split.straight_line_monthly,
                tier.unit_price / tier.lifetime_months
            );
        }
    }

    #[test]
    fn straight_line_defers_more_than_hybrid() {
        let (_, _, _, rec) = build();
        for m in 1..=MONTHS {
            assert!(
                rec.straight_line_ledger.closing_balance.at(m)
                    > rec.hybrid_ledger.closing_balance.at(m)
            );
        }
    }

    #[test]
    fn coverage_ratio_is_defined_and_below_one() {
        let (_, _, _, rec) = build();
        for m in 1..=MONTHS {
            let ratio = rec.coverage_ratio.at(m);
            assert!(ratio >= Decimal::ZERO);
            // Deferred hosting value is a fraction of the undiscounted
            // lifetime hosting obligation at retail scale.
            assert!(ratio < dec!(1000));
        }
    }
}
