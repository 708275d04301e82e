//! Unadjusted P&L: revenue, COGS, operating expenses, EBITDA, net income,
//! and the key per-unit ratios.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregate::CrossTier;
use crate::costs::InfraCosts;
use crate::error::ModelError;
use crate::projection::{compound_growth, Activity};
use crate::series::{ratio_or_zero, round0, zip, MonthlySeries, Temporality};
use crate::store::{keys, AssumptionStore};
use crate::tiers::Tier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub tier_revenue: [MonthlySeries; 3],
    pub extend_revenue: MonthlySeries,
    pub upgrade_revenue: MonthlySeries,
    pub gift_wrap_revenue: MonthlySeries,
    /// Add-on revenue combined; recognized immediately under every method.
    pub addon_revenue: MonthlySeries,
    pub total_revenue: MonthlySeries,
    pub tier_cogs: [MonthlySeries; 3],
    pub addon_cogs: MonthlySeries,
    pub total_cogs: MonthlySeries,
    pub gross_profit: MonthlySeries,
    pub gross_margin: MonthlySeries,
    pub marketing: MonthlySeries,
    pub shipping: MonthlySeries,
    pub payment_processing: MonthlySeries,
    pub support: MonthlySeries,
    pub insurance: MonthlySeries,
    pub infrastructure: MonthlySeries,
    pub total_opex: MonthlySeries,
    pub ebitda: MonthlySeries,
    pub ebitda_margin: MonthlySeries,
    pub tax: MonthlySeries,
    pub net_income: MonthlySeries,
    pub cumulative_net_income: MonthlySeries,
    pub cac: MonthlySeries,
    pub avg_revenue_per_unit: MonthlySeries,
    pub all_in_cost_per_unit: MonthlySeries,
    pub infra_cost_per_active_unit: MonthlySeries,
    /// Content volume doubled: primary CDN plus the cold backup mirror.
    pub replicated_storage_gb: MonthlySeries,
}

impl IncomeStatement {
    pub fn build(
        store: &AssumptionStore,
        tiers: &[Tier; 3],
        agg: &CrossTier,
        activity: &Activity,
        infra: &InfraCosts,
    ) -> Result<Self, ModelError> {
        let tier_revenue = [
            revenue_series(&agg.per_tier_sold[0], &tiers[0]),
            revenue_series(&agg.per_tier_sold[1], &tiers[1]),
            revenue_series(&agg.per_tier_sold[2], &tiers[2]),
        ];
        let tier_cogs = [
            cogs_series(&agg.per_tier_sold[0], &tiers[0]),
            cogs_series(&agg.per_tier_sold[1], &tiers[1]),
            cogs_series(&agg.per_tier_sold[2], &tiers[2]),
        ];

        // Add-on unit counts round like any other discrete sale. Extend and
        // upgrade attach to the cumulative base; gift wrap to new sales.
        let extend_attach = store.get(keys::EXTEND_ATTACH_RATE)?;
        let upgrade_attach = store.get(keys::UPGRADE_ATTACH_RATE)?;
        let gift_attach = store.get(keys::GIFT_WRAP_ATTACH_RATE)?;
        // Flow series even though they attach to a cumulative driver: the
        // add-on is sold this month.
        let extend_units = MonthlySeries::from_fn("extend_units", Temporality::Flow, |m| {
            round0(agg.cumulative_sold.at(m) * extend_attach)
        });
        let upgrade_units = MonthlySeries::from_fn("upgrade_units", Temporality::Flow, |m| {
            round0(agg.cumulative_sold.at(m) * upgrade_attach)
        });
        let gift_units = agg.total_sold.map("gift_wrap_units", |n| round0(n * gift_attach));

        let extend_revenue =
            extend_units.scale("extend_revenue", store.get(keys::EXTEND_PRICE)?);
        let upgrade_revenue =
            upgrade_units.scale("upgrade_revenue", store.get(keys::UPGRADE_PRICE)?);
        let gift_wrap_revenue =
            gift_units.scale("gift_wrap_revenue", store.get(keys::GIFT_WRAP_PRICE)?);
        let addon_revenue = crate::series::sum_all(
            "addon_revenue",
            &[&extend_revenue, &upgrade_revenue, &gift_wrap_revenue],
        );

        let total_revenue = crate::series::sum_all(
            "total_revenue",
            &[&tier_revenue[0], &tier_revenue[1], &tier_revenue[2], &addon_revenue],
        );

        let extend_cost = store.get(keys::EXTEND_COST)?;
        let upgrade_cost = store.get(keys::UPGRADE_COST)?;
        let gift_cost = store.get(keys::GIFT_WRAP_COST)?;
        let addon_cogs = MonthlySeries::from_fn("addon_cogs", Temporality::Flow, |m| {
            extend_units.at(m) * extend_cost
                + upgrade_units.at(m) * upgrade_cost
                + gift_units.at(m) * gift_cost
        });

        let total_cogs = crate::series::sum_all(
            "total_cogs",
            &[&tier_cogs[0], &tier_cogs[1], &tier_cogs[2], &addon_cogs],
        );

        let gross_profit = zip(
            "gross_profit",
            Temporality::Flow,
            &total_revenue,
            &total_cogs,
            |r, c| r - c,
        );
        let gross_margin = zip(
            "gross_margin",
            Temporality::Flow,
            &gross_profit,
            &total_revenue,
            |gp, r| ratio_or_zero(gp, r),
        );

        let marketing = compound_growth(
            "marketing_cost",
            store.get(keys::MARKETING_START)?,
            store.get(keys::MARKETING_GROWTH)?,
        );
        let shipping = agg
            .total_sold
            .scale("shipping_cost", store.get(keys::SHIPPING_COST_PER_UNIT)?);
        let payment_processing = total_revenue
            .scale("payment_processing_cost", store.get(keys::PAYMENT_PROCESSING_RATE)?);
        let support = compound_growth(
            "support_cost",
            store.get(keys::SUPPORT_START)?,
            store.get(keys::SUPPORT_GROWTH)?,
        );
        let insurance = compound_growth(
            "insurance_cost",
            store.get(keys::INSURANCE_START)?,
            store.get(keys::INSURANCE_GROWTH)?,
        );
        let infrastructure = infra
            .total_infrastructure
            .map("infrastructure_opex", |v| v);
        let total_opex = crate::series::sum_all(
            "total_opex",
            &[&infrastructure, &marketing, &shipping, &payment_processing, &support, &insurance],
        );

        let ebitda =
            zip("ebitda", Temporality::Flow, &gross_profit, &total_opex, |gp, ox| gp - ox);
        let ebitda_margin = zip(
            "ebitda_margin",
            Temporality::Flow,
            &ebitda,
            &total_revenue,
            |e, r| ratio_or_zero(e, r),
        );

        // Tax applies to positive EBITDA only; loss months carry no credit.
        let tax_rate = store.get(keys::TAX_RATE)?;
        let tax = ebitda.map("tax", |e| {
            if e > Decimal::ZERO {
                e * tax_rate
            } else {
                Decimal::ZERO
            }
        });
        let net_income = zip("net_income", Temporality::Flow, &ebitda, &tax, |e, t| e - t);
        let cumulative_net_income = net_income.cumulative("cumulative_net_income");

        let cac = zip("cac", Temporality::Flow, &marketing, &agg.total_sold, ratio_or_zero);
        let avg_revenue_per_unit = zip(
            "avg_revenue_per_unit",
            Temporality::Flow,
            &total_revenue,
            &agg.total_sold,
            ratio_or_zero,
        );
        let all_in_cost_per_unit =
            MonthlySeries::from_fn("all_in_cost_per_unit", Temporality::Flow, |m| {
                ratio_or_zero(total_cogs.at(m) + total_opex.at(m), agg.total_sold.at(m))
            });
        let infra_cost_per_active_unit = MonthlySeries::from_fn(
            "infra_cost_per_active_unit",
            Temporality::Flow,
            |m| ratio_or_zero(infrastructure.at(m), activity.active_units.at(m)),
        );
        let replicated_storage_gb = activity
            .content_gb
            .scale("replicated_storage_gb", dec!(2));

        Ok(Self {
            tier_revenue,
            extend_revenue,
            upgrade_revenue,
            gift_wrap_revenue,
            addon_revenue,
            total_revenue,
            tier_cogs,
            addon_cogs,
            total_cogs,
            gross_profit,
            gross_margin,
            marketing,
            shipping,
            payment_processing,
            support,
            insurance,
            infrastructure,
            total_opex,
            ebitda,
            ebitda_margin,
            tax,
            net_income,
            cumulative_net_income,
            cac,
            avg_revenue_per_unit,
            all_in_cost_per_unit,
            infra_cost_per_active_unit,
            replicated_storage_gb,
        })
    }
}

fn revenue_series(sold: &MonthlySeries, tier: &Tier) -> MonthlySeries {
    sold.scale(&format!("{}_revenue", tier.id.label()), tier.unit_price)
}

fn cogs_series(sold: &MonthlySeries, tier: &Tier) -> MonthlySeries {
    sold.scale(&format!("{}_cogs", tier.id.label()), tier.unit_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MONTHS;

    fn build() -> (AssumptionStore, CrossTier, IncomeStatement) {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        let agg = CrossTier::combine(crate::projection::unit_sales(&tiers));
        let activity = Activity::derive(&store, &agg.total_sold, &agg.cumulative_sold).unwrap();
        let infra = InfraCosts::allocate(&store, &activity).unwrap();
        let income = IncomeStatement::build(&store, &tiers, &agg, &activity, &infra).unwrap();
        (store, agg, income)
    }

    #[test]
    fn revenue_is_units_times_price() {
        let (_, agg, income) = build();
        assert_eq!(income.tier_revenue[0].at(1), agg.per_tier_sold[0].at(1) * dec!(29.99));
        assert_eq!(income.tier_revenue[2].at(5), agg.per_tier_sold[2].at(5) * dec!(69.99));
    }

    #[test]
    fn gross_profit_and_ebitda_tie_out() {
        let (_, _, income) = build();
        for m in 1..=MONTHS {
            assert_eq!(
                income.gross_profit.at(m),
                income.total_revenue.at(m) - income.total_cogs.at(m)
            );
            assert_eq!(
                income.ebitda.at(m),
                income.gross_profit.at(m) - income.total_opex.at(m)
            );
            assert_eq!(income.net_income.at(m), income.ebitda.at(m) - income.tax.at(m));
        }
    }

    #[test]
    fn tax_only_on_positive_ebitda() {
        let (store, _, income) = build();
        let rate = store.get(keys::TAX_RATE).unwrap();
        for m in 1..=MONTHS {
            let e = income.ebitda.at(m);
            let expected = if e > Decimal::ZERO { e * rate } else { Decimal::ZERO };
            assert_eq!(income.tax.at(m), expected);
        }
    }

    #[test]
    fn ratios_are_zero_before_any_sales() {
        // A store with zero starting volume and zero growth sells nothing;
        // every per-unit ratio must be a defined zero, not a NaN.
        let mut store = AssumptionStore::base_case();
        store.override_value(keys::START_UNITS_SHORT, Decimal::ZERO);
        store.override_value(keys::START_UNITS_MEDIUM, Decimal::ZERO);
        store.override_value(keys::START_UNITS_PERPETUAL, Decimal::ZERO);
        store.override_value(keys::EXTEND_ATTACH_RATE, Decimal::ZERO);
        store.override_value(keys::UPGRADE_ATTACH_RATE, Decimal::ZERO);
        store.override_value(keys::GIFT_WRAP_ATTACH_RATE, Decimal::ZERO);
        let tiers = Tier::all(&store).unwrap();
        let agg = CrossTier::combine(crate::projection::unit_sales(&tiers));
        let activity = Activity::derive(&store, &agg.total_sold, &agg.cumulative_sold).unwrap();
        let infra = InfraCosts::allocate(&store, &activity).unwrap();
        let income = IncomeStatement::build(&store, &tiers, &agg, &activity, &infra).unwrap();
        assert_eq!(income.avg_revenue_per_unit.at(1), Decimal::ZERO);
        assert_eq!(income.cac.at(1), Decimal::ZERO);
        assert_eq!(income.gross_margin.at(1), Decimal::ZERO);
    }
}
