//! The assumption store: an immutable key -> value mapping for one run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::keys;
use super::types::{Assumption, Unit};
use crate::error::ModelError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionStore {
    values: BTreeMap<String, Assumption>,
}

impl AssumptionStore {
    /// Looks up a value; absence is an error, never a default.
    pub fn get(&self, key: &str) -> Result<Decimal, ModelError> {
        self.values
            .get(key)
            .map(|a| a.value)
            .ok_or_else(|| ModelError::missing(key))
    }

    pub fn assumption(&self, key: &str) -> Result<&Assumption, ModelError> {
        self.values.get(key).ok_or_else(|| ModelError::missing(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assumption> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, key: &str, value: Decimal, unit: Unit) {
        self.values
            .insert(key.to_string(), Assumption { key: key.to_string(), value, unit });
    }

    /// Scenario variants change enumerated values only; the catalogue of
    /// keys is closed, so the key must already exist.
    pub(crate) fn override_value(&mut self, key: &str, value: Decimal) {
        debug_assert!(self.values.contains_key(key), "unknown assumption key '{key}'");
        if let Some(a) = self.values.get_mut(key) {
            a.value = value;
        }
    }

    /// The reference assumption set.
    pub fn base_case() -> Self {
        use Unit::*;
        let mut s = Self::default();

        // Tier pricing
        s.insert(keys::PRICE_SHORT, dec!(29.99), Currency);
        s.insert(keys::COGS_SHORT, dec!(8.50), Currency);
        s.insert(keys::PRICE_MEDIUM, dec!(44.99), Currency);
        s.insert(keys::COGS_MEDIUM, dec!(8.50), Currency);
        s.insert(keys::PRICE_PERPETUAL, dec!(69.99), Currency);
        s.insert(keys::COGS_PERPETUAL, dec!(9.00), Currency);
        s.insert(keys::LIFETIME_SHORT_MONTHS, dec!(120), Duration);
        s.insert(keys::LIFETIME_MEDIUM_MONTHS, dec!(180), Duration);
        s.insert(keys::LIFETIME_PERPETUAL_MONTHS, dec!(360), Duration);

        // Add-ons
        s.insert(keys::EXTEND_PRICE, dec!(14.99), Currency);
        s.insert(keys::EXTEND_COST, dec!(1.00), Currency);
        s.insert(keys::UPGRADE_PRICE, dec!(19.99), Currency);
        s.insert(keys::UPGRADE_COST, dec!(0.50), Currency);
        s.insert(keys::GIFT_WRAP_PRICE, dec!(4.99), Currency);
        s.insert(keys::GIFT_WRAP_COST, dec!(1.50), Currency);

        // Sales volume
        s.insert(keys::START_UNITS_SHORT, dec!(100), Count);
        s.insert(keys::GROWTH_SHORT, dec!(0.08), Percent);
        s.insert(keys::START_UNITS_MEDIUM, dec!(40), Count);
        s.insert(keys::GROWTH_MEDIUM, dec!(0.10), Percent);
        s.insert(keys::START_UNITS_PERPETUAL, dec!(15), Count);
        s.insert(keys::GROWTH_PERPETUAL, dec!(0.12), Percent);

        // Attach rates
        s.insert(keys::EXTEND_ATTACH_RATE, dec!(0.02), Percent);
        s.insert(keys::UPGRADE_ATTACH_RATE, dec!(0.01), Percent);
        s.insert(keys::GIFT_WRAP_ATTACH_RATE, dec!(0.15), Percent);

        // Content profile
        s.insert(keys::VIDEO_SIZE_MB, dec!(55), BytesScale);
        s.insert(keys::VIDEO_MIX, dec!(0.55), Percent);
        s.insert(keys::IMAGE_SIZE_MB, dec!(15), BytesScale);
        s.insert(keys::IMAGE_MIX, dec!(0.35), Percent);
        s.insert(keys::AUDIO_SIZE_MB, dec!(6), BytesScale);
        s.insert(keys::AUDIO_MIX, dec!(0.10), Percent);
        s.insert(keys::CLAIM_RATE, dec!(0.85), Percent);
        s.insert(keys::REUPLOAD_RATE, dec!(0.20), Percent);

        // Playback & request volume
        s.insert(keys::VIEWS_NOVELTY, dec!(8), Count);
        s.insert(keys::VIEWS_LONG_TAIL, dec!(2), Count);
        s.insert(keys::GLYPH_VERIFY_RATE, dec!(0.40), Percent);
        s.insert(keys::LIFECYCLE_API_CALLS, dec!(5), Count);
        s.insert(keys::TABLE_SETUP_WRITES, dec!(8), Count);
        s.insert(keys::TABLE_READS_PER_VIEW, dec!(3), Count);

        // Cold storage
        s.insert(keys::COLD_STORAGE_RATE_GB, dec!(0.01), Currency);
        s.insert(keys::COLD_WRITE_RATE_10K, dec!(0.10), Currency);
        s.insert(keys::COLD_READ_RATE_10K, dec!(0.01), Currency);
        s.insert(keys::COLD_RETRIEVAL_RATE_GB, dec!(0.01), Currency);
        s.insert(keys::COLD_EGRESS_RATE_GB, dec!(0.087), Currency);

        // CDN
        s.insert(keys::CDN_STORAGE_RATE_GB, dec!(0.015), Currency);
        s.insert(keys::CDN_CLASS_A_RATE_1M, dec!(4.50), Currency);
        s.insert(keys::CDN_CLASS_B_RATE_1M, dec!(0.36), Currency);
        s.insert(keys::CDN_EGRESS_RATE_GB, dec!(0.00), Currency);
        s.insert(keys::CDN_FREE_STORAGE_GB, dec!(10), BytesScale);
        s.insert(keys::CDN_FREE_CLASS_A, dec!(10000000), Count);
        s.insert(keys::CDN_FREE_CLASS_B, dec!(10000000), Count);

        // Table storage
        s.insert(keys::TABLE_STORAGE_RATE_GB, dec!(0.045), Currency);
        s.insert(keys::TABLE_TXN_RATE_10K, dec!(0.00036), Currency);
        s.insert(keys::TABLE_ENTITY_KB, dec!(2), BytesScale);

        // Compute
        s.insert(keys::COMPUTE_EXEC_RATE_1M, dec!(0.20), Currency);
        s.insert(keys::COMPUTE_GBS_RATE, dec!(0.000016), Currency);
        s.insert(keys::COMPUTE_DURATION_MS, dec!(200), Duration);
        s.insert(keys::COMPUTE_MEMORY_MB, dec!(128), BytesScale);
        s.insert(keys::COMPUTE_FREE_EXECUTIONS, dec!(1000000), Count);
        s.insert(keys::COMPUTE_FREE_GB_SECONDS, dec!(400000), Count);

        // Identity & fixed platform
        s.insert(keys::IDENTITY_BASE_COST, dec!(0.00), Currency);
        s.insert(keys::IDENTITY_MAU_RATE, dec!(0.0025), Currency);
        s.insert(keys::IDENTITY_FREE_MAU, dec!(50000), Count);
        s.insert(keys::MAU_PER_ACTIVE_UNIT, dec!(0.3), Percent);
        s.insert(keys::DOMAIN_MONTHLY_COST, dec!(15.00), Currency);
        s.insert(keys::MONITORING_MONTHLY_COST, dec!(10.00), Currency);

        // Operating expenses
        s.insert(keys::MARKETING_START, dec!(500), Currency);
        s.insert(keys::MARKETING_GROWTH, dec!(0.05), Percent);
        s.insert(keys::SHIPPING_COST_PER_UNIT, dec!(3.50), Currency);
        s.insert(keys::PAYMENT_PROCESSING_RATE, dec!(0.029), Percent);
        s.insert(keys::SUPPORT_START, dec!(200), Currency);
        s.insert(keys::SUPPORT_GROWTH, dec!(0.03), Percent);
        s.insert(keys::INSURANCE_START, dec!(150), Currency);
        s.insert(keys::INSURANCE_GROWTH, dec!(0.00), Percent);

        s.insert(keys::TAX_RATE, dec!(0.21), Percent);

        // Returns & replacements
        s.insert(keys::RETURN_RATE, dec!(0.06), Percent);
        s.insert(keys::PRE_CLAIM_SHARE, dec!(0.60), Percent);
        s.insert(keys::SALVAGE_RATE, dec!(0.80), Percent);
        s.insert(keys::RETURN_SHIPPING_COST, dec!(5.00), Currency);
        s.insert(keys::RETURN_PROCESSING_COST, dec!(2.00), Currency);
        s.insert(keys::DEFECT_RATE, dec!(0.03), Percent);
        s.insert(keys::REPLACEMENT_SHIPPING_COST, dec!(3.50), Currency);
        s.insert(keys::REPLACEMENT_COGS_SHARE, dec!(1.00), Percent);

        // Operational constants
        s.insert(keys::ADMIN_CALL_OVERHEAD, dec!(0.02), Percent);
        s.insert(keys::FALLBACK_READ_SHARE, dec!(0.02), Percent);
        s.insert(keys::CDN_WRITES_PER_CLAIM, dec!(2), Count);
        s.insert(keys::TABLE_WRITES_PER_GLYPH, dec!(2), Count);
        s.insert(keys::REQUEST_LOG_SAMPLING, dec!(0.1), Percent);
        s.insert(keys::NOVELTY_WINDOW_MONTHS, dec!(3), Duration);

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_case_is_a_closed_catalogue() {
        let store = AssumptionStore::base_case();
        assert!(store.len() >= 80, "catalogue holds ~85 keys, got {}", store.len());
        assert_eq!(store.get(keys::PRICE_SHORT).unwrap(), dec!(29.99));
    }

    #[test]
    fn missing_key_is_an_error_not_a_default() {
        let store = AssumptionStore::base_case();
        let err = store.get("no_such_key").unwrap_err();
        assert_eq!(err, ModelError::missing("no_such_key"));
    }
}
