use std::collections::BTreeMap;

use crate::models::{Category, Transaction};

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    /// Share of the grand total, rounded to one decimal. Zero when the total is zero.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year_month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub count: usize,
    /// Sorted by amount, largest first.
    pub categories: Vec<CategoryShare>,
    pub fixed_total: f64,
    pub fixed_ratio: f64,
    /// Ascending by year-month key.
    pub monthly: Vec<MonthlyTotal>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn top_categories(&self, n: usize) -> &[CategoryShare] {
        &self.categories[..n.min(self.categories.len())]
    }
}

fn round1(val: f64) -> f64 {
    (val * 10.0).round() / 10.0
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let count = transactions.len();
    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    let average = if count > 0 { total / count as f64 } else { 0.0 };
    let max = transactions
        .iter()
        .map(|t| t.amount)
        .fold(0.0_f64, f64::max);

    let mut by_category: BTreeMap<Category, f64> = BTreeMap::new();
    for t in transactions {
        *by_category.entry(t.category).or_default() += t.amount;
    }
    let mut categories: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: if total > 0.0 { round1(amount / total * 100.0) } else { 0.0 },
        })
        .collect();
    // BTreeMap iteration is in display order, so a stable sort breaks ties by it.
    categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let fixed_total: f64 = transactions
        .iter()
        .filter(|t| t.is_fixed)
        .map(|t| t.amount)
        .sum();
    let fixed_ratio = if total > 0.0 { fixed_total / total * 100.0 } else { 0.0 };

    Summary {
        total,
        average,
        max,
        count,
        categories,
        fixed_total,
        fixed_ratio,
        monthly: monthly_totals(transactions),
    }
}

pub fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<&str, f64> = BTreeMap::new();
    for t in transactions {
        *by_month.entry(t.year_month.as_str()).or_default() += t.amount;
    }
    by_month
        .into_iter()
        .map(|(ym, amount)| MonthlyTotal {
            year_month: ym.to_string(),
            amount,
        })
        .collect()
}
