use std::fmt;

use chrono::NaiveDate;

/// The fixed spending categories. Anything else is folded into `Other` (기타).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Transport,
    Cafe,
    Shopping,
    Housing,
    Subscription,
    Health,
    Leisure,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transport,
        Category::Cafe,
        Category::Shopping,
        Category::Housing,
        Category::Subscription,
        Category::Health,
        Category::Leisure,
        Category::Education,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "식비",
            Self::Transport => "교통비",
            Self::Cafe => "카페",
            Self::Shopping => "쇼핑",
            Self::Housing => "주거/통신",
            Self::Subscription => "구독",
            Self::Health => "의료/건강",
            Self::Leisure => "문화/여가",
            Self::Education => "교육",
            Self::Other => "기타",
        }
    }

    /// Exact label lookup. Returns `None` for labels outside the allow-list.
    pub fn from_label(label: &str) -> Option<Category> {
        Self::ALL.iter().find(|c| c.label() == label).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cleaned expense row. Every value here satisfies the preprocessing
/// invariants: positive amount, valid date, allow-listed category.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub payment_method: String,
    pub is_fixed: bool,
    pub year_month: String,
}

/// A single cell as read from the source file, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Field {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text(value: &str) -> Field {
        if value.is_empty() {
            Field::Empty
        } else {
            Field::Text(value.to_string())
        }
    }
}

/// Intermediate representation from the CSV/XLSX loader: header names exactly
/// as they appear in the file, and untyped rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Field>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Rebuild a raw table from cleaned transactions, using the exported
    /// column layout.
    #[cfg(test)]
    pub fn from_transactions(transactions: &[Transaction]) -> RawTable {
        let headers = crate::export::EXPORT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        let rows = transactions
            .iter()
            .map(|t| {
                vec![
                    Field::Date(t.date),
                    Field::Number(t.amount),
                    Field::text(t.category.label()),
                    Field::text(&t.description),
                    Field::text(&t.payment_method),
                    Field::Bool(t.is_fixed),
                    Field::text(&t.year_month),
                ]
            })
            .collect();
        RawTable { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()), Some(cat));
        }
        assert_eq!(Category::from_label("알수없음"), None);
        assert_eq!(Category::from_label(" 식비"), None);
    }

    #[test]
    fn test_field_blank() {
        assert!(Field::Empty.is_blank());
        assert!(Field::Text("   ".into()).is_blank());
        assert!(!Field::Number(0.0).is_blank());
        assert_eq!(Field::text(""), Field::Empty);
    }
}
