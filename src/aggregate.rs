//! Cross-tier aggregation: element-wise sums and running totals.

use serde::{Deserialize, Serialize};

use crate::series::{sum_all, MonthlySeries};
use crate::tiers::TierId;

/// Consolidated totals over the three per-tier unit-sales series, plus the
/// cumulative series recognition needs per tier. Aggregation is an
/// element-wise sum at each month index; order of the tiers is
/// irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTier {
    pub per_tier_sold: [MonthlySeries; 3],
    pub total_sold: MonthlySeries,
    pub cumulative_sold: MonthlySeries,
    pub per_tier_cumulative: [MonthlySeries; 3],
}

impl CrossTier {
    pub fn combine(per_tier_sold: [MonthlySeries; 3]) -> Self {
        let total_sold = sum_all(
            "total_units_sold",
            &[&per_tier_sold[0], &per_tier_sold[1], &per_tier_sold[2]],
        );
        let cumulative_sold = total_sold.cumulative("cumulative_units_sold");
        let per_tier_cumulative = [
            per_tier_sold[0].cumulative(&cum_name(TierId::Short)),
            per_tier_sold[1].cumulative(&cum_name(TierId::Medium)),
            per_tier_sold[2].cumulative(&cum_name(TierId::Perpetual)),
        ];
        Self { per_tier_sold, total_sold, cumulative_sold, per_tier_cumulative }
    }
}

fn cum_name(id: TierId) -> String {
    format!("{}_cumulative_sold", id.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::unit_sales;
    use crate::series::MONTHS;
    use crate::store::AssumptionStore;
    use crate::tiers::Tier;

    fn combined() -> CrossTier {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        CrossTier::combine(unit_sales(&tiers))
    }

    #[test]
    fn total_is_sum_of_tiers_each_month() {
        let agg = combined();
        for m in 1..=MONTHS {
            let expected = agg.per_tier_sold.iter().map(|s| s.at(m)).sum();
            assert_eq!(agg.total_sold.at(m), expected);
        }
    }

    #[test]
    fn final_cumulative_equals_sum_of_monthly() {
        let agg = combined();
        assert_eq!(agg.cumulative_sold.at(MONTHS), agg.total_sold.sum());
        for (sold, cum) in agg.per_tier_sold.iter().zip(&agg.per_tier_cumulative) {
            assert_eq!(cum.at(MONTHS), sold.sum());
        }
    }
}
