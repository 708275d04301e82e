//! Time-series projector: recurrence-based monthly series seeded from the
//! assumption store.
//!
//! Two recurrence families. Compounding growth rounds to whole units at
//! every step, so growth compounds on already-rounded integers rather than
//! a closed-form compound formula. Derived-from-driver series are pure
//! functions of already-computed series at the same month index, with the
//! "recent" window capped to the last 3 months of production and shrinking
//! when the month index is smaller, so there are no negative indices.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::series::{round0, round_dp, MonthlySeries, Temporality, MONTHS};
use crate::store::{keys, AssumptionStore};
use crate::tiers::Tier;

const MB_PER_GB: Decimal = dec!(1024);

/// `v[1] = start`, `v[m] = round(v[m-1] * (1 + growth))`. Month 1 seeds
/// directly from the assumption; there is no month 0.
pub fn compound_growth(name: &str, start: Decimal, growth: Decimal) -> MonthlySeries {
    let mut values = [Decimal::ZERO; MONTHS];
    values[0] = start;
    for m in 1..MONTHS {
        values[m] = round0(values[m - 1] * (Decimal::ONE + growth));
    }
    MonthlySeries::flow(name, values)
}

/// Per-tier unit sales, one compounding-growth series per tier.
pub fn unit_sales(tiers: &[Tier; 3]) -> [MonthlySeries; 3] {
    let series = |t: &Tier| {
        compound_growth(
            &format!("{}_units_sold", t.id.label()),
            t.starting_volume,
            t.monthly_growth,
        )
    };
    [series(&tiers[0]), series(&tiers[1]), series(&tiers[2])]
}

/// Weighted average content size in MB across the media mix. Drives every
/// storage calculation.
pub fn weighted_content_mb(store: &AssumptionStore) -> Result<Decimal, ModelError> {
    Ok(store.get(keys::VIDEO_SIZE_MB)? * store.get(keys::VIDEO_MIX)?
        + store.get(keys::IMAGE_SIZE_MB)? * store.get(keys::IMAGE_MIX)?
        + store.get(keys::AUDIO_SIZE_MB)? * store.get(keys::AUDIO_MIX)?)
}

/// Usage and activity series derived from aggregated unit sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Claimed units actually storing content (stock).
    pub active_units: MonthlySeries,
    /// Content uploaded this month (GB).
    pub new_content_gb: MonthlySeries,
    /// Cumulative content stored (GB); both the CDN and the cold-storage
    /// mirror hold this volume.
    pub content_gb: MonthlySeries,
    pub playback_views: MonthlySeries,
    pub glyph_calls: MonthlySeries,
    pub compute_invocations: MonthlySeries,
    pub cdn_class_a_ops: MonthlySeries,
    pub cdn_class_b_ops: MonthlySeries,
    pub cold_write_ops: MonthlySeries,
    pub cold_read_ops: MonthlySeries,
    pub table_transactions: MonthlySeries,
    pub playback_bandwidth_gb: MonthlySeries,
}

impl Activity {
    pub fn derive(
        store: &AssumptionStore,
        total_sold: &MonthlySeries,
        cumulative_sold: &MonthlySeries,
    ) -> Result<Self, ModelError> {
        let claim = store.get(keys::CLAIM_RATE)?;
        let avg_mb = weighted_content_mb(store)?;
        let novelty_rate = store.get(keys::VIEWS_NOVELTY)?;
        let long_tail_rate = store.get(keys::VIEWS_LONG_TAIL)?;
        let glyph_rate = store.get(keys::GLYPH_VERIFY_RATE)?;
        let lifecycle_calls = store.get(keys::LIFECYCLE_API_CALLS)?;
        let admin_overhead = store.get(keys::ADMIN_CALL_OVERHEAD)?;
        let writes_per_claim = store.get(keys::CDN_WRITES_PER_CLAIM)?;
        let reupload = store.get(keys::REUPLOAD_RATE)?;
        let fallback_share = store.get(keys::FALLBACK_READ_SHARE)?;
        let setup_writes = store.get(keys::TABLE_SETUP_WRITES)?;
        let reads_per_view = store.get(keys::TABLE_READS_PER_VIEW)?;
        let writes_per_glyph = store.get(keys::TABLE_WRITES_PER_GLYPH)?;

        let window_key = keys::NOVELTY_WINDOW_MONTHS;
        let window = store
            .get(window_key)?
            .to_usize()
            .filter(|w| *w >= 1)
            .ok_or_else(|| ModelError::invalid(window_key, "must be a positive month count"))?;

        let active_units = MonthlySeries::from_fn("active_units", Temporality::Stock, |m| {
            round0(cumulative_sold.at(m) * claim)
        });

        let new_content_gb = MonthlySeries::from_fn("new_content_gb", Temporality::Flow, |m| {
            round_dp(total_sold.at(m) * claim * avg_mb / MB_PER_GB, 2)
        });
        let content_gb = new_content_gb.cumulative("content_gb");

        // Units sold in the last `window` months view at the novelty rate;
        // the older remainder of the active base views at the long-tail rate.
        let playback_views = MonthlySeries::from_fn("playback_views", Temporality::Flow, |m| {
            let from = m.saturating_sub(window - 1).max(1);
            let recent = total_sold.sum_months(from, m);
            let older = (active_units.at(m) - recent).max(Decimal::ZERO);
            round0(recent * novelty_rate + older * long_tail_rate)
        });

        let glyph_calls = playback_views.map("glyph_calls", |v| round0(v * glyph_rate));

        let compute_invocations =
            MonthlySeries::from_fn("compute_invocations", Temporality::Flow, |m| {
                round0(
                    total_sold.at(m) * claim * lifecycle_calls
                        + playback_views.at(m)
                        + glyph_calls.at(m)
                        + playback_views.at(m) * admin_overhead,
                )
            });

        let cdn_class_a_ops = total_sold.map("cdn_class_a_ops", |sold| {
            round0(sold * claim * writes_per_claim * (Decimal::ONE + reupload))
        });
        let cdn_class_b_ops =
            MonthlySeries::from_fn("cdn_class_b_ops", Temporality::Flow, |m| playback_views.at(m));
        let cold_write_ops =
            MonthlySeries::from_fn("cold_write_ops", Temporality::Flow, |m| cdn_class_a_ops.at(m));
        let cold_read_ops =
            playback_views.map("cold_read_ops", |v| round0(v * fallback_share));

        let table_transactions =
            MonthlySeries::from_fn("table_transactions", Temporality::Flow, |m| {
                round0(
                    total_sold.at(m) * claim * setup_writes
                        + playback_views.at(m) * reads_per_view
                        + glyph_calls.at(m) * writes_per_glyph,
                )
            });

        let playback_bandwidth_gb = playback_views
            .map("playback_bandwidth_gb", |v| round_dp(v * avg_mb / MB_PER_GB, 1));

        Ok(Self {
            active_units,
            new_content_gb,
            content_gb,
            playback_views,
            glyph_calls,
            compute_invocations,
            cdn_class_a_ops,
            cdn_class_b_ops,
            cold_write_ops,
            cold_read_ops,
            table_transactions,
            playback_bandwidth_gb,
        })
    }

    /// All usage series that feed the cost allocator.
    pub fn usage_series(&self) -> [&MonthlySeries; 9] {
        [
            &self.content_gb,
            &self.playback_views,
            &self.compute_invocations,
            &self.cdn_class_a_ops,
            &self.cdn_class_b_ops,
            &self.cold_write_ops,
            &self.cold_read_ops,
            &self.table_transactions,
            &self.active_units,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::sum_all;

    #[test]
    fn growth_compounds_on_rounded_integers() {
        let s = compound_growth("u", dec!(100), dec!(0.08));
        assert_eq!(s.at(1), dec!(100));
        // round(100 * 1.08) = 108, not a closed-form power
        assert_eq!(s.at(2), dec!(108));
        // round(108 * 1.08) = round(116.64) = 117; closed form would give 116.64
        assert_eq!(s.at(3), dec!(117));
        assert_eq!(s.at(4), dec!(126)); // round(117 * 1.08) = round(126.36)
    }

    #[test]
    fn novelty_window_shrinks_below_month_three() {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        let sold = unit_sales(&tiers);
        let total = sum_all("total_units_sold", &[&sold[0], &sold[1], &sold[2]]);
        let cumulative = total.cumulative("cumulative_units_sold");
        let activity = Activity::derive(&store, &total, &cumulative).unwrap();

        // Month 1: the whole active base is recent, so everything views at
        // the novelty rate and nothing at the long-tail rate.
        let claim = store.get(keys::CLAIM_RATE).unwrap();
        let active_1 = round0(total.at(1) * claim);
        let recent_1 = total.at(1);
        let older_1 = (active_1 - recent_1).max(Decimal::ZERO);
        assert_eq!(older_1, Decimal::ZERO);
        assert_eq!(activity.playback_views.at(1), round0(recent_1 * dec!(8)));
    }

    #[test]
    fn usage_series_are_non_negative() {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        let sold = unit_sales(&tiers);
        let total = sum_all("total_units_sold", &[&sold[0], &sold[1], &sold[2]]);
        let cumulative = total.cumulative("cumulative_units_sold");
        let activity = Activity::derive(&store, &total, &cumulative).unwrap();
        for series in activity.usage_series() {
            assert!(series.ensure_non_negative().is_ok(), "{}", series.name());
        }
    }

    #[test]
    fn weighted_content_size_matches_mix() {
        let store = AssumptionStore::base_case();
        // 55*0.55 + 15*0.35 + 6*0.10
        assert_eq!(weighted_content_mb(&store).unwrap(), dec!(36.10));
    }
}
