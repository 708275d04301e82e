use std::fmt::Write;

use rust_decimal::Decimal;

use crate::engine::ModelRun;
use crate::series::MonthlySeries;
use crate::summary::summarize;

const RULE: &str = "------------------------------------------------------------------";

/// Renders the annual summary report for one completed run.
pub fn format_report(title: &str, run: &ModelRun) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PROJECTION SUMMARY: {title}");
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "{:<34} {:>14} {:>14} {:>14}", "line item", "year 1", "year 2", "total");
    for series in run.headline_series() {
        let annual = summarize(series);
        let _ = writeln!(
            out,
            "{:<34} {:>14} {:>14} {:>14}",
            series.name(),
            money(annual.year1),
            money(annual.year2),
            money(annual.total),
        );
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "LIFETIME HOSTING COST vs RETAIL");
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>14} {:>12} {:>14}",
        "tier", "hosting", "with setup", "% retail", "profit/loss"
    );
    for row in &run.lifetime_costs {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>14} {:>11}% {:>14}",
            row.tier.label(),
            money(row.hosting_only),
            money(row.hosting_plus_setup),
            percent(row.pct_of_retail),
            money(row.profit_or_loss),
        );
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MONTHLY COST BY CONTENT SIZE");
    let _ = writeln!(
        out,
        "{:<10} {:>12} {:>12} {:>14} {:>12} {:>12}",
        "size MB", "cdn", "cold", "compute+table", "monthly", "annual"
    );
    for point in &run.size_grid {
        let _ = writeln!(
            out,
            "{:<10} {:>12} {:>12} {:>14} {:>12} {:>12}",
            point.size_mb,
            money(point.cdn_storage),
            money(point.cold_storage),
            money(point.compute_and_table),
            money(point.monthly_total),
            money(point.annual_total),
        );
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "REVENUE RECOGNITION POLICIES (24-month totals)");
    for (label, series) in [
        ("cash at sale", &run.recognition.cash_total),
        ("hybrid split", &run.recognition.hybrid_total),
        ("straight line", &run.recognition.straight_line_total),
    ] {
        let _ = writeln!(out, "  {:<16} {:>14}", label, money(series.sum()));
    }
    let closing = &run.recognition.hybrid_ledger.closing_balance;
    let _ = writeln!(
        out,
        "  {:<16} {:>14}",
        "deferred (end)",
        money(closing.at(crate::series::MONTHS))
    );

    out
}

/// One series as a month-by-month table, two columns of twelve.
pub fn format_series(series: &MonthlySeries) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", series.name());
    for half in 0..2 {
        for i in 0..12 {
            let m = half * 12 + i + 1;
            let _ = write!(out, "{:>5}:{:>12}", format!("m{m}"), money(series.at(m)));
        }
        let _ = writeln!(out);
    }
    out
}

fn money(v: Decimal) -> String {
    format!("{:.2}", v)
}

fn percent(v: Decimal) -> String {
    format!("{:.1}", v * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AssumptionStore;

    #[test]
    fn report_names_every_headline_series() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        let report = format_report("base", &run);
        for series in run.headline_series() {
            assert!(report.contains(series.name()), "{}", series.name());
        }
        assert!(report.contains("LIFETIME HOSTING COST"));
        assert!(report.contains("straight line"));
    }

    #[test]
    fn series_table_covers_both_years() {
        let run = ModelRun::compute(&AssumptionStore::base_case()).unwrap();
        let table = format_series(&run.income.total_revenue);
        assert!(table.contains("m1:"));
        assert!(table.contains("m24:"));
    }
}
