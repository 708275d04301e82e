//! The three priced product tiers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::store::{keys, AssumptionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierId {
    /// 10-year lifetime.
    Short,
    /// 15-year lifetime.
    Medium,
    /// Perpetual (modeled as a 30-year hosting horizon).
    Perpetual,
}

impl TierId {
    pub const ALL: [TierId; 3] = [TierId::Short, TierId::Medium, TierId::Perpetual];

    pub fn label(&self) -> &'static str {
        match self {
            TierId::Short => "short",
            TierId::Medium => "medium",
            TierId::Perpetual => "perpetual",
        }
    }
}

/// One tier's pricing, volume and amortization parameters, resolved from
/// the store once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    pub starting_volume: Decimal,
    pub monthly_growth: Decimal,
    /// Amortization horizon for recognition and lifetime hosting cost.
    /// Every tier's lifetime exceeds the 24-month window, so nothing
    /// expires inside a run.
    pub lifetime_months: Decimal,
}

impl Tier {
    pub fn from_store(store: &AssumptionStore, id: TierId) -> Result<Self, ModelError> {
        let (price, cost, start, growth, lifetime) = match id {
            TierId::Short => (
                keys::PRICE_SHORT,
                keys::COGS_SHORT,
                keys::START_UNITS_SHORT,
                keys::GROWTH_SHORT,
                keys::LIFETIME_SHORT_MONTHS,
            ),
            TierId::Medium => (
                keys::PRICE_MEDIUM,
                keys::COGS_MEDIUM,
                keys::START_UNITS_MEDIUM,
                keys::GROWTH_MEDIUM,
                keys::LIFETIME_MEDIUM_MONTHS,
            ),
            TierId::Perpetual => (
                keys::PRICE_PERPETUAL,
                keys::COGS_PERPETUAL,
                keys::START_UNITS_PERPETUAL,
                keys::GROWTH_PERPETUAL,
                keys::LIFETIME_PERPETUAL_MONTHS,
            ),
        };
        Ok(Self {
            id,
            unit_price: store.get(price)?,
            unit_cost: store.get(cost)?,
            starting_volume: store.get(start)?,
            monthly_growth: store.get(growth)?,
            lifetime_months: store.get(lifetime)?,
        })
    }

    /// All three tiers in canonical order.
    pub fn all(store: &AssumptionStore) -> Result<[Tier; 3], ModelError> {
        Ok([
            Tier::from_store(store, TierId::Short)?,
            Tier::from_store(store, TierId::Medium)?,
            Tier::from_store(store, TierId::Perpetual)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tiers_resolve_from_base_case() {
        let store = AssumptionStore::base_case();
        let tiers = Tier::all(&store).unwrap();
        assert_eq!(tiers[0].unit_price, dec!(29.99));
        assert_eq!(tiers[1].lifetime_months, dec!(180));
        assert_eq!(tiers[2].starting_volume, dec!(15));
    }
}
