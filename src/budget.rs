use crate::models::Category;
use crate::summary::Summary;

/// Suggested budget as a fraction of current spend.
pub const BUDGET_RATIO: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecommendation {
    pub category: Category,
    pub current_amount: f64,
    pub recommended_amount: f64,
    pub savings: f64,
}

/// One row per summary category, in summary order. Recommended budgets are
/// floored to whole won.
pub fn recommend(summary: &Summary) -> Vec<BudgetRecommendation> {
    summary
        .categories
        .iter()
        .map(|share| {
            let recommended_amount = (share.amount * BUDGET_RATIO).floor();
            BudgetRecommendation {
                category: share.category,
                current_amount: share.amount,
                recommended_amount,
                savings: share.amount - recommended_amount,
            }
        })
        .collect()
}

pub fn total_savings(rows: &[BudgetRecommendation]) -> f64 {
    rows.iter().map(|r| r.savings).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::CategoryShare;

    fn summary_with(amounts: &[(Category, f64)]) -> Summary {
        let total: f64 = amounts.iter().map(|(_, a)| a).sum();
        Summary {
            total,
            average: 0.0,
            max: 0.0,
            count: amounts.len(),
            categories: amounts
                .iter()
                .map(|(c, a)| CategoryShare {
                    category: *c,
                    amount: *a,
                    percentage: 0.0,
                })
                .collect(),
            fixed_total: 0.0,
            fixed_ratio: 0.0,
            monthly: vec![],
        }
    }

    #[test]
    fn test_recommend_floors_ninety_percent() {
        let s = summary_with(&[(Category::Food, 123_457.0), (Category::Cafe, 4_500.0)]);
        let rows = recommend(&s);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, Category::Food);
        assert_eq!(rows[0].recommended_amount, 111_111.0);
        assert_eq!(rows[0].savings, 12_346.0);
        assert_eq!(rows[1].recommended_amount, 4_050.0);
        assert_eq!(rows[1].savings, 450.0);
        assert_eq!(total_savings(&rows), 12_796.0);
    }

    #[test]
    fn test_recommendation_never_exceeds_current() {
        let s = summary_with(&[
            (Category::Food, 1.0),
            (Category::Transport, 9.99),
            (Category::Health, 1_000_001.0),
            (Category::Other, 0.5),
        ]);
        for row in recommend(&s) {
            assert!(row.recommended_amount <= row.current_amount);
            assert_eq!(row.savings, row.current_amount - row.recommended_amount);
        }
    }

    #[test]
    fn test_empty_summary_has_no_rows() {
        assert!(recommend(&summary_with(&[])).is_empty());
    }
}
