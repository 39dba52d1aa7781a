use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::budget::{total_savings, BudgetRecommendation};
use crate::fmt::{number, won};
use crate::models::Transaction;
use crate::preprocess::{DropReason, Repair, ValidationReport};
use crate::summary::{MonthlyTotal, Summary};

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

fn amount_cell(val: f64) -> Cell {
    Cell::new(won(val)).set_alignment(CellAlignment::Right)
}

pub fn format_kpis(summary: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["지표", "값"]);
    table.add_row(vec![Cell::new("총 지출"), amount_cell(summary.total)]);
    table.add_row(vec![Cell::new("평균 지출"), amount_cell(summary.average)]);
    table.add_row(vec![Cell::new("최대 지출"), amount_cell(summary.max)]);
    let count = format!("{}건", number(summary.count as f64));
    table.add_row(vec![
        Cell::new("거래 건수"),
        Cell::new(count).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![Cell::new("고정 지출"), amount_cell(summary.fixed_total)]);
    table.add_row(vec![
        Cell::new("고정 지출 비율"),
        Cell::new(format!("{:.2}%", summary.fixed_ratio)).set_alignment(CellAlignment::Right),
    ]);
    format!("{}\n{table}", "핵심 지표 (KPI)".bold())
}

pub fn format_categories(summary: &Summary, limit: Option<usize>) -> String {
    let rows = match limit {
        Some(n) => summary.top_categories(n),
        None => &summary.categories[..],
    };
    let mut table = Table::new();
    table.set_header(vec!["카테고리", "금액", "%"]);
    for c in rows {
        table.add_row(vec![
            Cell::new(c.category.label()),
            amount_cell(c.amount),
            Cell::new(format!("{:.1}%", c.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }
    let title = match limit {
        Some(n) => format!("카테고리별 지출 (Top {n})"),
        None => "카테고리별 지출".to_string(),
    };
    format!("{}\n{table}", title.bold())
}

pub fn format_monthly(months: &[MonthlyTotal]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["월", "금액"]);
    for m in months {
        table.add_row(vec![Cell::new(&m.year_month), amount_cell(m.amount)]);
    }
    format!("{}\n{table}", "월별 지출".bold())
}

pub fn format_budget(rows: &[BudgetRecommendation]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["카테고리", "현재", "추천 예산", "절감"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.category.label()),
            amount_cell(r.current_amount),
            amount_cell(r.recommended_amount),
            amount_cell(r.savings),
        ]);
    }
    table.add_row(vec![
        Cell::new("합계".bold()),
        amount_cell(rows.iter().map(|r| r.current_amount).sum()),
        amount_cell(rows.iter().map(|r| r.recommended_amount).sum()),
        amount_cell(total_savings(rows)),
    ]);
    format!("{}\n{table}", "추천 예산".bold())
}

/// First rows of the cleaned selection, in file order.
pub fn format_transactions(rows: &[Transaction], limit: usize) -> String {
    let mut table = Table::new();
    table.set_header(vec!["날짜", "금액", "카테고리", "내역", "결제수단", "고정"]);
    for t in rows.iter().take(limit) {
        table.add_row(vec![
            Cell::new(t.date),
            amount_cell(t.amount),
            Cell::new(t.category.label()),
            Cell::new(&t.description),
            Cell::new(&t.payment_method),
            Cell::new(if t.is_fixed { "Y" } else { "" }),
        ]);
    }
    let title = format!(
        "전처리된 데이터 미리보기 ({} / {}건)",
        number(rows.len().min(limit) as f64),
        number(rows.len() as f64)
    );
    format!("{}\n{table}", title.bold())
}

pub fn format_validation_totals(report: &ValidationReport) -> String {
    format!(
        "{} rows read, {} kept, {} dropped, {} repaired",
        report.input_rows,
        report.kept,
        report.dropped.len(),
        report.repaired.len()
    )
}

pub fn format_validation(report: &ValidationReport) -> String {
    let mut lines = vec![format_validation_totals(report)];
    for reason in [
        DropReason::InvalidDate,
        DropReason::InvalidAmount,
        DropReason::NonPositiveAmount,
    ] {
        let n = report.dropped_by(reason);
        if n > 0 {
            lines.push(format!("  dropped ({}): {n}", reason.describe()));
        }
    }
    let count = |pred: fn(&Repair) -> bool| {
        report
            .repaired
            .iter()
            .filter(|r| pred(&r.repair))
            .count()
    };
    let repairs = [
        ("category → 기타", report.categories_folded()),
        ("description filled", count(|r| matches!(r, Repair::DescriptionFilled))),
        ("is_fixed filled", count(|r| matches!(r, Repair::FixedFlagFilled))),
        ("is_fixed coerced", count(|r| matches!(r, Repair::FixedFlagCoerced(_)))),
    ];
    for (label, n) in repairs {
        if n > 0 {
            lines.push(format!("  repaired ({label}): {n}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::recommend;
    use crate::insight::tests::sample_summary;
    use crate::preprocess::{DroppedRow, RowRepair};

    #[test]
    fn test_format_kpis_contains_values() {
        colored::control::set_override(false);
        let out = format_kpis(&sample_summary());
        assert!(out.contains("30,000원"));
        assert!(out.contains("15,000원"));
        assert!(out.contains("2건"));
    }

    #[test]
    fn test_format_categories_limit() {
        colored::control::set_override(false);
        let out = format_categories(&sample_summary(), Some(1));
        assert!(out.contains("Top 1"));
        assert!(out.contains("기타"));
        assert!(!out.contains("식비"));
    }

    #[test]
    fn test_format_budget_totals() {
        colored::control::set_override(false);
        let out = format_budget(&recommend(&sample_summary()));
        assert!(out.contains("27,000원"));
        assert!(out.contains("3,000원"));
    }

    #[test]
    fn test_format_validation_lists_reasons() {
        let report = ValidationReport {
            input_rows: 4,
            kept: 2,
            repaired: vec![RowRepair {
                row: 4,
                repair: Repair::CategoryToOther("알수없음".into()),
            }],
            dropped: vec![
                DroppedRow {
                    row: 2,
                    reason: DropReason::InvalidDate,
                },
                DroppedRow {
                    row: 3,
                    reason: DropReason::NonPositiveAmount,
                },
            ],
        };
        let out = format_validation(&report);
        assert!(out.starts_with("4 rows read, 2 kept, 2 dropped, 1 repaired"));
        assert!(out.contains("dropped (unparseable date): 1"));
        assert!(out.contains("repaired (category → 기타): 1"));
        assert!(!out.contains("unparseable amount"));
    }

    #[test]
    fn test_format_transactions_limits_rows() {
        colored::control::set_override(false);
        let txn = |day: u32, amount: f64| Transaction {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            amount,
            category: crate::models::Category::Cafe,
            description: format!("커피 {day}"),
            payment_method: "카드".into(),
            is_fixed: day == 1,
            year_month: "2024-01".into(),
        };
        let rows: Vec<Transaction> = (1..=25).map(|d| txn(d, 4500.0)).collect();
        let out = format_transactions(&rows, 20);
        assert!(out.contains("미리보기 (20 / 25건)"));
        assert!(out.contains("2024-01-20"));
        assert!(out.contains("커피 20"));
        assert!(!out.contains("2024-01-21"));
        assert!(out.contains("4,500원"));
    }

    #[test]
    fn test_format_validation_totals_line() {
        let report = ValidationReport {
            input_rows: 3,
            kept: 3,
            ..Default::default()
        };
        assert_eq!(
            format_validation_totals(&report),
            "3 rows read, 3 kept, 0 dropped, 0 repaired"
        );
    }
}
