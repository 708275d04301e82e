//! Named scenario parameter sets.
//!
//! Each scenario is an independent assumption store differing from the
//! base case only in the enumerated values below; every varied parameter
//! moves monotonically from conservative to optimistic.

use serde::{Deserialize, Serialize};

use rust_decimal_macros::dec;

use super::keys;
use super::registry::AssumptionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    Conservative,
    Base,
    Optimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Conservative, Scenario::Base, Scenario::Optimistic];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Base => "base",
            Scenario::Optimistic => "optimistic",
        }
    }

    /// Builds this scenario's assumption store.
    pub fn store(&self) -> AssumptionStore {
        let mut s = AssumptionStore::base_case();
        match self {
            Scenario::Base => {}
            Scenario::Conservative => {
                s.override_value(keys::PRICE_SHORT, dec!(24.99));
                s.override_value(keys::PRICE_MEDIUM, dec!(39.99));
                s.override_value(keys::PRICE_PERPETUAL, dec!(59.99));
                s.override_value(keys::START_UNITS_SHORT, dec!(50));
                s.override_value(keys::START_UNITS_MEDIUM, dec!(20));
                s.override_value(keys::START_UNITS_PERPETUAL, dec!(5));
                s.override_value(keys::GROWTH_SHORT, dec!(0.05));
                s.override_value(keys::GROWTH_MEDIUM, dec!(0.06));
                s.override_value(keys::GROWTH_PERPETUAL, dec!(0.08));
                s.override_value(keys::COGS_SHORT, dec!(10.00));
                s.override_value(keys::COGS_MEDIUM, dec!(10.00));
                s.override_value(keys::COGS_PERPETUAL, dec!(10.50));
                s.override_value(keys::VIEWS_NOVELTY, dec!(4));
                s.override_value(keys::VIEWS_LONG_TAIL, dec!(1));
                // Image mix absorbs the video shift so the mix stays at 100%.
                s.override_value(keys::VIDEO_MIX, dec!(0.40));
                s.override_value(keys::IMAGE_MIX, dec!(0.50));
                s.override_value(keys::MARKETING_START, dec!(250));
                s.override_value(keys::EXTEND_ATTACH_RATE, dec!(0.01));
                s.override_value(keys::GIFT_WRAP_ATTACH_RATE, dec!(0.08));
            }
            Scenario::Optimistic => {
                s.override_value(keys::PRICE_SHORT, dec!(34.99));
                s.override_value(keys::PRICE_MEDIUM, dec!(54.99));
                s.override_value(keys::PRICE_PERPETUAL, dec!(89.99));
                s.override_value(keys::START_UNITS_SHORT, dec!(200));
                s.override_value(keys::START_UNITS_MEDIUM, dec!(80));
                s.override_value(keys::START_UNITS_PERPETUAL, dec!(30));
                s.override_value(keys::GROWTH_SHORT, dec!(0.12));
                s.override_value(keys::GROWTH_MEDIUM, dec!(0.15));
                s.override_value(keys::GROWTH_PERPETUAL, dec!(0.18));
                s.override_value(keys::COGS_SHORT, dec!(7.00));
                s.override_value(keys::COGS_MEDIUM, dec!(7.00));
                s.override_value(keys::COGS_PERPETUAL, dec!(7.50));
                s.override_value(keys::VIEWS_NOVELTY, dec!(15));
                s.override_value(keys::VIEWS_LONG_TAIL, dec!(5));
                s.override_value(keys::VIDEO_MIX, dec!(0.70));
                s.override_value(keys::IMAGE_MIX, dec!(0.20));
                s.override_value(keys::MARKETING_START, dec!(1000));
                s.override_value(keys::EXTEND_ATTACH_RATE, dec!(0.04));
                s.override_value(keys::GIFT_WRAP_ATTACH_RATE, dec!(0.25));
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::validate::validate;

    #[test]
    fn every_scenario_store_validates() {
        for scenario in Scenario::ALL {
            assert_eq!(validate(&scenario.store()), Ok(()), "{}", scenario.name());
        }
    }

    #[test]
    fn base_scenario_matches_base_case() {
        assert_eq!(Scenario::Base.store(), AssumptionStore::base_case());
    }
}
