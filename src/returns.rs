//! Returns, defects and the adjusted P&L.
//!
//! Returned units split into pre-claim (restockable, partial COGS salvage)
//! and post-claim (content destroyed, full COGS write-off). Defective units
//! are replaced free of charge. The adjusted statement restates revenue net
//! of refunds and loads the return economics into COGS and overhead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::CrossTier;
use crate::error::ModelError;
use crate::income::IncomeStatement;
use crate::projection::Activity;
use crate::series::{ratio_or_zero, round0, zip, MonthlySeries, Temporality, MONTHS};
use crate::store::{keys, AssumptionStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsAdjustment {
    pub returned_units: MonthlySeries,
    pub pre_claim_returns: MonthlySeries,
    pub post_claim_returns: MonthlySeries,
    pub replacement_units: MonthlySeries,
    pub refunds: MonthlySeries,
    pub return_shipping: MonthlySeries,
    pub return_processing: MonthlySeries,
    /// Full COGS write-off on post-claim returns; the content is gone.
    pub dead_cogs: MonthlySeries,
    /// Negative series: COGS recovered by restocking pre-claim returns.
    pub salvage_credit: MonthlySeries,
    pub replacement_cogs: MonthlySeries,
    pub replacement_shipping: MonthlySeries,
    pub total_impact: MonthlySeries,
    pub net_revenue: MonthlySeries,
    pub adjusted_cogs: MonthlySeries,
    pub returns_overhead: MonthlySeries,
    pub adjusted_gross_profit: MonthlySeries,
    pub adjusted_gross_margin: MonthlySeries,
    pub adjusted_ebitda: MonthlySeries,
    pub adjusted_ebitda_margin: MonthlySeries,
    pub adjusted_tax: MonthlySeries,
    pub adjusted_net_income: MonthlySeries,
    pub cumulative_adjusted_net_income: MonthlySeries,
    /// Active base net of post-claim attrition, carried unrounded.
    pub net_active_units: MonthlySeries,
    pub margin_erosion: MonthlySeries,
}

impl ReturnsAdjustment {
    pub fn build(
        store: &AssumptionStore,
        agg: &CrossTier,
        activity: &Activity,
        income: &IncomeStatement,
    ) -> Result<Self, ModelError> {
        let return_rate = store.get(keys::RETURN_RATE)?;
        let pre_claim_share = store.get(keys::PRE_CLAIM_SHARE)?;
        let defect_rate = store.get(keys::DEFECT_RATE)?;

        let returned_units = agg
            .total_sold
            .map("returned_units", |n| round0(n * return_rate));
        let pre_claim_returns = returned_units
            .map("pre_claim_returns", |r| round0(r * pre_claim_share));
        let post_claim_returns = zip(
            "post_claim_returns",
            Temporality::Flow,
            &returned_units,
            &pre_claim_returns,
            |r, pre| r - pre,
        );
        let replacement_units = agg
            .total_sold
            .map("replacement_units", |n| round0(n * defect_rate));

        // Blended unit economics of the month being returned against.
        let avg_price = zip(
            "avg_selling_price",
            Temporality::Flow,
            &income.total_revenue,
            &agg.total_sold,
            ratio_or_zero,
        );
        let avg_cogs = zip(
            "avg_unit_cogs",
            Temporality::Flow,
            &income.total_cogs,
            &agg.total_sold,
            ratio_or_zero,
        );

        let refunds = zip(
            "refunds",
            Temporality::Flow,
            &returned_units,
            &avg_price,
            |r, p| r * p,
        );
        let return_shipping = returned_units
            .scale("return_shipping", store.get(keys::RETURN_SHIPPING_COST)?);
        let return_processing = returned_units
            .scale("return_processing", store.get(keys::RETURN_PROCESSING_COST)?);
        let dead_cogs = zip(
            "dead_cogs",
            Temporality::Flow,
            &post_claim_returns,
            &avg_cogs,
            |units, c| units * c,
        );
        let salvage_rate = store.get(keys::SALVAGE_RATE)?;
        let salvage_credit = zip(
            "salvage_credit",
            Temporality::Flow,
            &pre_claim_returns,
            &avg_cogs,
            |units, c| -(units * c * salvage_rate),
        );
        let cogs_share = store.get(keys::REPLACEMENT_COGS_SHARE)?;
        let replacement_cogs = zip(
            "replacement_cogs",
            Temporality::Flow,
            &replacement_units,
            &avg_cogs,
            |units, c| units * c * cogs_share,
        );
        let replacement_shipping = replacement_units
            .scale("replacement_shipping", store.get(keys::REPLACEMENT_SHIPPING_COST)?);

        let total_impact = crate::series::sum_all(
            "total_returns_impact",
            &[
                &refunds,
                &return_shipping,
                &return_processing,
                &dead_cogs,
                &salvage_credit,
                &replacement_cogs,
                &replacement_shipping,
            ],
        );

        let net_revenue = zip(
            "net_revenue",
            Temporality::Flow,
            &income.total_revenue,
            &refunds,
            |r, f| r - f,
        );
        let adjusted_cogs = crate::series::sum_all(
            "adjusted_cogs",
            &[&income.total_cogs, &dead_cogs, &salvage_credit, &replacement_cogs],
        );
        let returns_overhead = crate::series::sum_all(
            "returns_overhead",
            &[&return_shipping, &return_processing, &replacement_shipping],
        );
        let adjusted_gross_profit =
            MonthlySeries::from_fn("adjusted_gross_profit", Temporality::Flow, |m| {
                net_revenue.at(m) - adjusted_cogs.at(m) - returns_overhead.at(m)
            });
        let adjusted_gross_margin = zip(
            "adjusted_gross_margin",
            Temporality::Flow,
            &adjusted_gross_profit,
            &net_revenue,
            ratio_or_zero,
        );
        let adjusted_ebitda = zip(
            "adjusted_ebitda",
            Temporality::Flow,
            &adjusted_gross_profit,
            &income.total_opex,
            |gp, ox| gp - ox,
        );
        let adjusted_ebitda_margin = zip(
            "adjusted_ebitda_margin",
            Temporality::Flow,
            &adjusted_ebitda,
            &net_revenue,
            ratio_or_zero,
        );
        let tax_rate = store.get(keys::TAX_RATE)?;
        let adjusted_tax = adjusted_ebitda.map("adjusted_tax", |e| {
            if e > Decimal::ZERO {
                e * tax_rate
            } else {
                Decimal::ZERO
            }
        });
        let adjusted_net_income = zip(
            "adjusted_net_income",
            Temporality::Flow,
            &adjusted_ebitda,
            &adjusted_tax,
            |e, t| e - t,
        );
        let cumulative_adjusted_net_income =
            adjusted_net_income.cumulative("cumulative_adjusted_net_income");

        // Roll-forward of the claimed base, net of post-claim attrition.
        // First month starts from the rounded active figure; subsequent
        // months accrue the unrounded claim inflow.
        let claim_rate = store.get(keys::CLAIM_RATE)?;
        let mut net_active = [Decimal::ZERO; MONTHS];
        net_active[0] = activity.active_units.at(1) - post_claim_returns.at(1);
        for m in 2..=MONTHS {
            net_active[m - 1] = net_active[m - 2] + agg.total_sold.at(m) * claim_rate
                - post_claim_returns.at(m);
        }
        let net_active_units =
            MonthlySeries::new("net_active_units", Temporality::Stock, net_active);

        let margin_erosion = zip(
            "margin_erosion",
            Temporality::Flow,
            &total_impact,
            &income.total_revenue,
            ratio_or_zero,
        );

        Ok(Self {
            returned_units,
            pre_claim_returns,
            post_claim_returns,
            replacement_units,
            refunds,
            return_shipping,
            return_processing,
            dead_cogs,
            salvage_credit,
            replacement_cogs,
            replacement_shipping,
            total_impact,
            net_revenue,
            adjusted_cogs,
            returns_overhead,
            adjusted_gross_profit,
            adjusted_gross_margin,
            adjusted_ebitda,
            adjusted_ebitda_margin,
            adjusted_tax,
            adjusted_net_income,
            cumulative_adjusted_net_income,
            net_active_units,
            margin_erosion,
        })
    }
}
