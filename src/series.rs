//! Named, ordered monthly series over the fixed 24-month horizon.
//!
//! Every quantity the pipeline computes is a [`MonthlySeries`]: one value
//! per calendar month index 1..=24, tagged `Flow` or `Stock`, never mutated
//! after creation. Later stages build new series rather than editing
//! existing ones.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Fixed projection horizon in months.
pub const MONTHS: usize = 24;

/// Whether a series accumulates across months (`Flow`: revenue, unit
/// sales) or measures a level at a point in time (`Stock`: cumulative
/// balances, ending storage). Summing a `Stock` across months is
/// meaningless, so the annual summarizer branches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temporality {
    Flow,
    Stock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    name: String,
    temporality: Temporality,
    values: [Decimal; MONTHS],
}

impl MonthlySeries {
    pub fn new(name: &str, temporality: Temporality, values: [Decimal; MONTHS]) -> Self {
        Self { name: name.to_string(), temporality, values }
    }

    /// Builds a series by evaluating `f` at each 1-based month index.
    pub fn from_fn(
        name: &str,
        temporality: Temporality,
        mut f: impl FnMut(usize) -> Decimal,
    ) -> Self {
        let mut values = [Decimal::ZERO; MONTHS];
        for m in 1..=MONTHS {
            values[m - 1] = f(m);
        }
        Self::new(name, temporality, values)
    }

    pub fn flow(name: &str, values: [Decimal; MONTHS]) -> Self {
        Self::new(name, Temporality::Flow, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temporality(&self) -> Temporality {
        self.temporality
    }

    /// Value at the given 1-based month index.
    #[inline(always)]
    pub fn at(&self, month: usize) -> Decimal {
        debug_assert!((1..=MONTHS).contains(&month));
        self.values[month - 1]
    }

    pub fn values(&self) -> &[Decimal; MONTHS] {
        &self.values
    }

    /// Running sum through each month: `cum[1] = src[1]`,
    /// `cum[m] = cum[m-1] + src[m]`. Always a `Stock`.
    pub fn cumulative(&self, name: &str) -> MonthlySeries {
        let mut values = [Decimal::ZERO; MONTHS];
        let mut running = Decimal::ZERO;
        for m in 0..MONTHS {
            running += self.values[m];
            values[m] = running;
        }
        MonthlySeries::new(name, Temporality::Stock, values)
    }

    pub fn sum(&self) -> Decimal {
        self.values.iter().copied().sum()
    }

    /// Inclusive sum over a 1-based month range.
    pub fn sum_months(&self, from: usize, to: usize) -> Decimal {
        debug_assert!(from >= 1 && to <= MONTHS && from <= to);
        self.values[from - 1..to].iter().copied().sum()
    }

    pub fn map(&self, name: &str, f: impl Fn(Decimal) -> Decimal) -> MonthlySeries {
        MonthlySeries::from_fn(name, self.temporality, |m| f(self.at(m)))
    }

    pub fn scale(&self, name: &str, factor: Decimal) -> MonthlySeries {
        self.map(name, |v| v * factor)
    }

    /// Rejects the series if any month is negative. Usage series feed the
    /// cost allocator, which must never silently produce negative cost.
    pub fn ensure_non_negative(&self) -> Result<(), ModelError> {
        for m in 1..=MONTHS {
            if self.at(m) < Decimal::ZERO {
                return Err(ModelError::NegativeUsage { metric: self.name.clone(), month: m });
            }
        }
        Ok(())
    }
}

/// Element-wise combination of two series.
pub fn zip(
    name: &str,
    temporality: Temporality,
    a: &MonthlySeries,
    b: &MonthlySeries,
    f: impl Fn(Decimal, Decimal) -> Decimal,
) -> MonthlySeries {
    MonthlySeries::from_fn(name, temporality, |m| f(a.at(m), b.at(m)))
}

/// Element-wise sum of any number of series. Addition is associative and
/// order-independent, so summing the parts in any order is identical.
pub fn sum_all(name: &str, parts: &[&MonthlySeries]) -> MonthlySeries {
    MonthlySeries::from_fn(name, Temporality::Flow, |m| {
        parts.iter().map(|s| s.at(m)).sum()
    })
}

/// Ratio with a defined zero on a zero denominator. Margin %, CAC and the
/// coverage ratio hit empty months early in a run; that is an edge case,
/// not an error, and must never propagate a NaN.
pub fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Half-away-from-zero rounding to whole units, applied at each recurrence
/// step so growth compounds on already-rounded integers.
pub fn round0(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_dp(v: Decimal, dp: u32) -> Decimal {
    v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn counting_series() -> MonthlySeries {
        MonthlySeries::from_fn("m", Temporality::Flow, |m| Decimal::from(m as u32))
    }

    #[test]
    fn cumulative_matches_running_sum() {
        let s = counting_series();
        let cum = s.cumulative("cum");
        assert_eq!(cum.temporality(), Temporality::Stock);
        assert_eq!(cum.at(1), s.at(1));
        for m in 2..=MONTHS {
            assert_eq!(cum.at(m), cum.at(m - 1) + s.at(m));
        }
        assert_eq!(cum.at(MONTHS), s.sum());
    }

    #[test]
    fn sum_all_is_order_independent() {
        let a = counting_series();
        let b = a.scale("b", dec!(3));
        let c = a.scale("c", dec!(-1));
        let abc = sum_all("abc", &[&a, &b, &c]);
        let cba = sum_all("cba", &[&c, &b, &a]);
        assert_eq!(abc.values(), cba.values());
    }

    #[test]
    fn ratio_or_zero_defined_on_zero_denominator() {
        assert_eq!(ratio_or_zero(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio_or_zero(dec!(5), dec!(2)), dec!(2.5));
    }

    #[test]
    fn round0_is_half_away_from_zero() {
        assert_eq!(round0(dec!(2.5)), dec!(3));
        assert_eq!(round0(dec!(-2.5)), dec!(-3));
        assert_eq!(round0(dec!(107.9999)), dec!(108));
    }

    #[test]
    fn negative_usage_is_reported_with_month() {
        let mut values = [Decimal::ZERO; MONTHS];
        values[6] = dec!(-1);
        let s = MonthlySeries::flow("cdn_reads", values);
        let err = s.ensure_non_negative().unwrap_err();
        assert_eq!(
            err,
            crate::error::ModelError::NegativeUsage { metric: "cdn_reads".into(), month: 7 }
        );
    }
}
