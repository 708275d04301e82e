//! Annual rollups over the 24-month horizon.
//!
//! Flows sum within each year; stocks report the year-end level. A stock's
//! "total" is its final level, never a sum across months.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::series::{MonthlySeries, Temporality, MONTHS};

const YEAR_END_1: usize = 12;
const YEAR_END_2: usize = MONTHS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualFigure {
    pub year1: Decimal,
    pub year2: Decimal,
    pub total: Decimal,
}

pub fn summarize(series: &MonthlySeries) -> AnnualFigure {
    match series.temporality() {
        Temporality::Flow => AnnualFigure {
            year1: series.sum_months(1, YEAR_END_1),
            year2: series.sum_months(YEAR_END_1 + 1, YEAR_END_2),
            total: series.sum(),
        },
        Temporality::Stock => AnnualFigure {
            year1: series.at(YEAR_END_1),
            year2: series.at(YEAR_END_2),
            total: series.at(YEAR_END_2),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flow_years_partition_the_total() {
        let s = MonthlySeries::from_fn("rev", Temporality::Flow, |m| Decimal::from(m as u32));
        let annual = summarize(&s);
        assert_eq!(annual.year1, dec!(78)); // 1 + 2 + ... + 12
        assert_eq!(annual.year2, dec!(222)); // 13 + ... + 24
        assert_eq!(annual.total, annual.year1 + annual.year2);
    }

    #[test]
    fn stock_reports_year_end_levels() {
        let flow = MonthlySeries::from_fn("f", Temporality::Flow, |_| dec!(10));
        let stock = flow.cumulative("balance");
        let annual = summarize(&stock);
        assert_eq!(annual.year1, dec!(120));
        assert_eq!(annual.year2, dec!(240));
        // Never 12 months of balances added together.
        assert_eq!(annual.total, annual.year2);
    }
}
