use std::path::Path;

use chrono::NaiveDateTime;

use crate::budget::BudgetRecommendation;
use crate::error::Result;
use crate::fmt::{number, won};
use crate::summary::Summary;

pub const REPORT_FILE_NAME: &str = "monthly_expense_report.md";

/// Placeholder used when a report is written without an AI narrative.
pub const NO_NARRATIVE: &str = "AI 분석이 생성되지 않았습니다.";

/// Render the markdown report. Pure formatting: every figure comes from the
/// arguments, including the timestamp.
pub fn render_markdown(
    summary: &Summary,
    narrative: &str,
    budget: &[BudgetRecommendation],
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("# 월간 지출 분석 리포트\n\n");
    out.push_str(&format!(
        "생성 일시: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M")
    ));

    out.push_str("## 핵심 지표\n");
    out.push_str(&format!("- 총 지출: {}\n", won(summary.total)));
    out.push_str(&format!("- 평균 지출: {}\n", won(summary.average)));
    out.push_str(&format!("- 최대 지출: {}\n", won(summary.max)));
    out.push_str(&format!("- 거래 건수: {}건\n\n", number(summary.count as f64)));

    out.push_str("## 카테고리별 지출\n");
    for c in &summary.categories {
        out.push_str(&format!(
            "- {}: {} ({:.1}%)\n",
            c.category,
            won(c.amount),
            c.percentage
        ));
    }
    out.push('\n');

    out.push_str("## AI 분석\n");
    out.push_str(narrative.trim());
    out.push_str("\n\n");

    out.push_str("## 추천 예산\n");
    for row in budget {
        out.push_str(&format!(
            "- {}: 현재 {} → 추천 {} (절감 {})\n",
            row.category,
            won(row.current_amount),
            won(row.recommended_amount),
            won(row.savings)
        ));
    }
    out
}

pub fn write_report(path: &Path, markdown: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, markdown)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::recommend;
    use crate::insight::tests::sample_summary;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_render_layout() {
        let summary = sample_summary();
        let budget = recommend(&summary);
        let md = render_markdown(&summary, "지출이 안정적입니다.\n", &budget, at());
        let expected = "\
# 월간 지출 분석 리포트

생성 일시: 2024-02-01 09:30

## 핵심 지표
- 총 지출: 30,000원
- 평균 지출: 15,000원
- 최대 지출: 20,000원
- 거래 건수: 2건

## 카테고리별 지출
- 기타: 20,000원 (66.7%)
- 식비: 10,000원 (33.3%)

## AI 분석
지출이 안정적입니다.

## 추천 예산
- 기타: 현재 20,000원 → 추천 18,000원 (절감 2,000원)
- 식비: 현재 10,000원 → 추천 9,000원 (절감 1,000원)
";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let summary = sample_summary();
        let budget = recommend(&summary);
        let a = render_markdown(&summary, NO_NARRATIVE, &budget, at());
        let b = render_markdown(&summary, NO_NARRATIVE, &budget, at());
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_report_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(REPORT_FILE_NAME);
        write_report(&path, "# hi\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi\n");
    }
}
