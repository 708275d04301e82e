//! Steady-state per-unit hosting cost, independent of fleet volume.
//!
//! The monthly cost of exactly one unit of content at the configured size
//! and view-rate profile. Free-tier allowances are NOT subtracted here;
//! the same metering formulas run at one-unit scale, and the figure is the
//! raw service cost.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::projection::weighted_content_mb;
use crate::series::{ratio_or_zero, round_dp};
use crate::store::{keys, AssumptionStore};
use crate::tiers::{Tier, TierId};

const PER_10K: Decimal = dec!(10000);
const PER_1M: Decimal = dec!(1000000);
const MB_PER_GB: Decimal = dec!(1024);
const KB_PER_GB: Decimal = dec!(1048576);
const MS_PER_S: Decimal = dec!(1000);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Fixed sensitivity grid (MB): audio-only, image gallery, weighted base
/// case, typical video, heavy video, the hard API cap.
pub const SIZE_POINTS_MB: [Decimal; 6] =
    [dec!(6), dec!(15), dec!(35.85), dec!(55), dec!(100), dec!(150)];

/// One-time setup cost, claim through finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupCosts {
    pub compute_lifecycle: Decimal,
    pub cdn_upload_writes: Decimal,
    pub cold_upload_writes: Decimal,
    pub table_setup_writes: Decimal,
    pub table_first_month_storage: Decimal,
    pub total: Decimal,
}

/// Monthly ongoing cost per unit, by service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPerUnit {
    pub cdn: Decimal,
    pub cold: Decimal,
    pub table: Decimal,
    pub compute: Decimal,
    pub identity: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerUnitCosts {
    pub content_mb: Decimal,
    pub content_gb: Decimal,
    /// Year-weighted views per month: novelty window at the high rate,
    /// the remainder of the year at the long-tail rate.
    pub blended_views: Decimal,
    pub calls_per_view: Decimal,
    pub table_reads_per_view: Decimal,
    pub table_writes_per_view: Decimal,
    pub setup: SetupCosts,
    pub monthly: MonthlyPerUnit,
}

impl PerUnitCosts {
    pub fn derive(store: &AssumptionStore) -> Result<Self, ModelError> {
        let content_mb = weighted_content_mb(store)?;
        let content_gb = content_mb / MB_PER_GB;

        let novelty = store.get(keys::VIEWS_NOVELTY)?;
        let long_tail = store.get(keys::VIEWS_LONG_TAIL)?;
        let window = store.get(keys::NOVELTY_WINDOW_MONTHS)?;
        let blended_views =
            round_dp((novelty * window + long_tail * (MONTHS_PER_YEAR - window)) / MONTHS_PER_YEAR, 1);

        let glyph_rate = store.get(keys::GLYPH_VERIFY_RATE)?;
        let calls_per_view = Decimal::ONE + glyph_rate;
        let table_reads_per_view = store.get(keys::TABLE_READS_PER_VIEW)?;
        let table_writes_per_view = round_dp(
            glyph_rate * store.get(keys::TABLE_WRITES_PER_GLYPH)?
                + store.get(keys::REQUEST_LOG_SAMPLING)?,
            1,
        );

        let exec_rate = store.get(keys::COMPUTE_EXEC_RATE_1M)?;
        let gbs_rate = store.get(keys::COMPUTE_GBS_RATE)?;
        let duration_s = store.get(keys::COMPUTE_DURATION_MS)? / MS_PER_S;
        let memory_gb = store.get(keys::COMPUTE_MEMORY_MB)? / MB_PER_GB;
        let gbs_per_call = duration_s * memory_gb;

        let lifecycle_calls = store.get(keys::LIFECYCLE_API_CALLS)?;
        let upload_ops =
            store.get(keys::CDN_WRITES_PER_CLAIM)? * (Decimal::ONE + store.get(keys::REUPLOAD_RATE)?);
        let entity_gb = store.get(keys::TABLE_ENTITY_KB)? / KB_PER_GB;
        let table_storage_rate = store.get(keys::TABLE_STORAGE_RATE_GB)?;
        let txn_rate = store.get(keys::TABLE_TXN_RATE_10K)?;

        let setup = {
            let compute_lifecycle = lifecycle_calls / PER_1M * exec_rate
                + lifecycle_calls * gbs_per_call * gbs_rate;
            let cdn_upload_writes = upload_ops / PER_1M * store.get(keys::CDN_CLASS_A_RATE_1M)?;
            let cold_upload_writes = upload_ops / PER_10K * store.get(keys::COLD_WRITE_RATE_10K)?;
            let table_setup_writes =
                store.get(keys::TABLE_SETUP_WRITES)? / PER_10K * txn_rate;
            let table_first_month_storage = entity_gb * table_storage_rate;
            let total = compute_lifecycle
                + cdn_upload_writes
                + cold_upload_writes
                + table_setup_writes
                + table_first_month_storage;
            SetupCosts {
                compute_lifecycle,
                cdn_upload_writes,
                cold_upload_writes,
                table_setup_writes,
                table_first_month_storage,
                total,
            }
        };

        let fallback = store.get(keys::FALLBACK_READ_SHARE)?;
        let monthly = {
            let cdn = content_gb * store.get(keys::CDN_STORAGE_RATE_GB)?
                + blended_views / PER_1M * store.get(keys::CDN_CLASS_B_RATE_1M)?
                + blended_views * content_gb * store.get(keys::CDN_EGRESS_RATE_GB)?;
            let cold = content_gb * store.get(keys::COLD_STORAGE_RATE_GB)?
                + blended_views * fallback / PER_10K * store.get(keys::COLD_READ_RATE_10K)?
                + blended_views * fallback * content_gb * store.get(keys::COLD_RETRIEVAL_RATE_GB)?
                + blended_views * fallback * content_gb * store.get(keys::COLD_EGRESS_RATE_GB)?;
            let table = entity_gb * table_storage_rate
                + blended_views * table_reads_per_view / PER_10K * txn_rate
                + blended_views * table_writes_per_view / PER_10K * txn_rate;
            let compute = blended_views * calls_per_view / PER_1M * exec_rate
                + blended_views * calls_per_view * gbs_per_call * gbs_rate;
            let identity =
                store.get(keys::MAU_PER_ACTIVE_UNIT)? * store.get(keys::IDENTITY_MAU_RATE)?;
            let total = cdn + cold + table + compute + identity;
            MonthlyPerUnit { cdn, cold, table, compute, identity, total }
        };

        Ok(Self {
            content_mb,
            content_gb,
            blended_views,
            calls_per_view,
            table_reads_per_view,
            table_writes_per_view,
            setup,
            monthly,
        })
    }

    /// Lifetime hosting cost per tier against its retail price.
    pub fn lifetime_table(&self, tiers: &[Tier; 3]) -> Vec<LifetimeCost> {
        tiers
            .iter()
            .map(|t| {
                let hosting_only = self.monthly.total * t.lifetime_months;
                let hosting_plus_setup = hosting_only + self.setup.total;
                LifetimeCost {
                    tier: t.id,
                    hosting_only,
                    hosting_plus_setup,
                    pct_of_retail: ratio_or_zero(hosting_plus_setup, t.unit_price),
                    profit_or_loss: t.unit_price - hosting_plus_setup,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeCost {
    pub tier: TierId,
    pub hosting_only: Decimal,
    pub hosting_plus_setup: Decimal,
    pub pct_of_retail: Decimal,
    pub profit_or_loss: Decimal,
}

/// Monthly cost at each fixed content-size point, holding the view-rate
/// profile constant. Compute and table costs are size-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePoint {
    pub size_mb: Decimal,
    pub cdn_storage: Decimal,
    pub cold_storage: Decimal,
    pub compute_and_table: Decimal,
    pub monthly_total: Decimal,
    pub annual_total: Decimal,
}

pub fn size_sensitivity(
    per_unit: &PerUnitCosts,
    store: &AssumptionStore,
) -> Result<Vec<SizePoint>, ModelError> {
    let fallback = store.get(keys::FALLBACK_READ_SHARE)?;
    let bv = per_unit.blended_views;
    let compute_and_table = per_unit.monthly.compute + per_unit.monthly.table;

    SIZE_POINTS_MB
        .iter()
        .map(|&size_mb| {
            let gb = size_mb / MB_PER_GB;
            let cdn_storage = gb * store.get(keys::CDN_STORAGE_RATE_GB)?;
            let cold_storage = gb * store.get(keys::COLD_STORAGE_RATE_GB)?
                + bv * fallback / PER_10K * store.get(keys::COLD_READ_RATE_10K)?
                + bv * fallback * gb * store.get(keys::COLD_RETRIEVAL_RATE_GB)?
                + bv * fallback * gb * store.get(keys::COLD_EGRESS_RATE_GB)?;
            let monthly_total =
                cdn_storage + cold_storage + compute_and_table + per_unit.monthly.identity;
            Ok(SizePoint {
                size_mb,
                cdn_storage,
                cold_storage,
                compute_and_table,
                monthly_total,
                annual_total: monthly_total * MONTHS_PER_YEAR,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> (AssumptionStore, PerUnitCosts) {
        let store = AssumptionStore::base_case();
        let per_unit = PerUnitCosts::derive(&store).unwrap();
        (store, per_unit)
    }

    #[test]
    fn blended_views_are_year_weighted() {
        let (_, per_unit) = base();
        // (8 * 3 + 2 * 9) / 12 = 3.5
        assert_eq!(per_unit.blended_views, dec!(3.5));
    }

    #[test]
    fn monthly_total_sums_services() {
        let (_, per_unit) = base();
        let m = &per_unit.monthly;
        assert_eq!(m.total, m.cdn + m.cold + m.table + m.compute + m.identity);
        assert!(m.total > Decimal::ZERO);
    }

    #[test]
    fn lifetime_cost_scales_with_tier_lifetime() {
        let (store, per_unit) = base();
        let tiers = Tier::all(&store).unwrap();
        let table = per_unit.lifetime_table(&tiers);
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].hosting_only, per_unit.monthly.total * dec!(120));
        assert_eq!(table[2].hosting_only, per_unit.monthly.total * dec!(360));
        for row in &table {
            assert_eq!(row.hosting_plus_setup, row.hosting_only + per_unit.setup.total);
        }
    }

    #[test]
    fn sensitivity_grid_is_monotonic_in_size() {
        let (store, per_unit) = base();
        let grid = size_sensitivity(&per_unit, &store).unwrap();
        assert_eq!(grid.len(), SIZE_POINTS_MB.len());
        for pair in grid.windows(2) {
            assert!(pair[1].monthly_total > pair[0].monthly_total);
        }
        for point in &grid {
            assert_eq!(point.annual_total, point.monthly_total * dec!(12));
        }
    }

    #[test]
    fn per_unit_model_never_subtracts_free_tiers() {
        let (_, per_unit) = base();
        // One unit's CDN storage is billed from the first byte even though
        // the fleet-level allocator would see it inside the allowance.
        assert!(per_unit.monthly.cdn > Decimal::ZERO);
    }
}
