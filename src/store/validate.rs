//! Domain validation of an assumption store, run before any computation.
//!
//! Any violation fails the entire run; no partial results are returned.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::keys;
use super::registry::AssumptionStore;
use super::types::Unit;
use crate::error::ModelError;

const GROWTH_KEYS: &[&str] = &[
    keys::GROWTH_SHORT,
    keys::GROWTH_MEDIUM,
    keys::GROWTH_PERPETUAL,
    keys::MARKETING_GROWTH,
    keys::SUPPORT_GROWTH,
    keys::INSURANCE_GROWTH,
];

pub fn validate(store: &AssumptionStore) -> Result<(), ModelError> {
    // Prices, rates and counts must not be negative.
    for a in store.iter() {
        match a.unit {
            Unit::Currency | Unit::Count | Unit::BytesScale | Unit::Duration => {
                if a.value < Decimal::ZERO {
                    return Err(ModelError::invalid(&a.key, "must not be negative"));
                }
            }
            Unit::Percent => {}
        }
    }

    // A growth rate at or below -100% makes the recurrence degenerate.
    for key in GROWTH_KEYS {
        if store.get(key)? <= dec!(-1) {
            return Err(ModelError::invalid(key, "growth rate must exceed -100%"));
        }
    }

    // Non-growth percentages are shares and must not be negative.
    for a in store.iter() {
        if a.unit == Unit::Percent
            && !GROWTH_KEYS.contains(&a.key.as_str())
            && a.value < Decimal::ZERO
        {
            return Err(ModelError::invalid(&a.key, "must not be negative"));
        }
    }

    // The content mix drives every storage calculation and must be a
    // complete partition.
    let mix = store.get(keys::VIDEO_MIX)?
        + store.get(keys::IMAGE_MIX)?
        + store.get(keys::AUDIO_MIX)?;
    if mix != Decimal::ONE {
        return Err(ModelError::invalid(
            keys::VIDEO_MIX,
            format!("content mix must sum to 100%, got {}", mix * dec!(100)),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_case_passes() {
        assert_eq!(validate(&AssumptionStore::base_case()), Ok(()));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut store = AssumptionStore::base_case();
        store.override_value(keys::PRICE_MEDIUM, dec!(-1));
        let err = validate(&store).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAssumption { key, .. } if key == keys::PRICE_MEDIUM));
    }

    #[test]
    fn degenerate_growth_is_rejected() {
        let mut store = AssumptionStore::base_case();
        store.override_value(keys::GROWTH_SHORT, dec!(-1));
        assert!(validate(&store).is_err());
    }

    #[test]
    fn incomplete_content_mix_is_rejected() {
        let mut store = AssumptionStore::base_case();
        store.override_value(keys::VIDEO_MIX, dec!(0.50));
        let err = validate(&store).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAssumption { .. }));
    }
}
