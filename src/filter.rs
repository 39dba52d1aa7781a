use chrono::NaiveDate;

use crate::error::{Result, SpendError};
use crate::models::{Category, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    /// An explicit pick. An empty list selects nothing.
    Only(Vec<Category>),
}

impl CategorySelection {
    pub fn contains(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(list) => list.contains(&category),
        }
    }

    /// Flip one category in or out, starting from the full set.
    pub fn toggle(&mut self, category: Category) {
        let mut list = match self {
            Self::All => Category::ALL.to_vec(),
            Self::Only(list) => list.clone(),
        };
        if let Some(pos) = list.iter().position(|c| *c == category) {
            list.remove(pos);
        } else {
            list.push(category);
            list.sort();
        }
        *self = if list.len() == Category::ALL.len() {
            Self::All
        } else {
            Self::Only(list)
        };
    }
}

/// The date-range and category selection applied before summarizing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub categories: CategorySelection,
}

impl Filter {
    pub fn new(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        categories: CategorySelection,
    ) -> Result<Filter> {
        match (from, to) {
            (Some(_), None) => {
                return Err(SpendError::Other(
                    "--from requires --to (both date boundaries must be specified)".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(SpendError::Other(
                    "--to requires --from (both date boundaries must be specified)".to_string(),
                ));
            }
            (Some(f), Some(t)) if f > t => {
                return Err(SpendError::Other(format!(
                    "--from {f} is after --to {t}"
                )));
            }
            _ => {}
        }
        Ok(Filter { from, to, categories })
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(from) = self.from {
            if txn.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if txn.date > to {
                return false;
            }
        }
        self.categories.contains(txn.category)
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

/// Earliest and latest transaction dates, used as the default range.
pub fn date_bounds(transactions: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let min = transactions.iter().map(|t| t.date).min()?;
    let max = transactions.iter().map(|t| t.date).max()?;
    Some((min, max))
}

/// Categories present in the data, in display order.
pub fn present_categories(transactions: &[Transaction]) -> Vec<Category> {
    Category::ALL
        .iter()
        .copied()
        .filter(|c| transactions.iter().any(|t| t.category == *c))
        .collect()
}
