use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{Result, SpendError};
use crate::loader::excel_serial_to_date;
use crate::models::{Category, Field, RawTable, Transaction};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "date",
    "amount",
    "category",
    "description",
    "payment_method",
    "is_fixed",
];

pub const DEFAULT_DESCRIPTION: &str = "내역 없음";

const TRUTHY: &[&str] = &["true", "t", "yes", "y", "1", "o", "고정", "예"];
const FALSY: &[&str] = &["false", "f", "no", "n", "0", "x", "변동", "아니오"];

static EMPTY: Field = Field::Empty;

// ---------------------------------------------------------------------------
// Validation report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    InvalidDate,
    InvalidAmount,
    NonPositiveAmount,
}

impl DropReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::InvalidDate => "unparseable date",
            Self::InvalidAmount => "unparseable amount",
            Self::NonPositiveAmount => "amount is zero or negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Category outside the allow-list, rewritten to 기타. Holds the original label.
    CategoryToOther(String),
    DescriptionFilled,
    FixedFlagFilled,
    /// Unrecognized is_fixed token coerced to false. Holds the original token.
    FixedFlagCoerced(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    /// 1-based data row number in the source (header excluded).
    pub row: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowRepair {
    pub row: usize,
    pub repair: Repair,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub input_rows: usize,
    pub kept: usize,
    pub repaired: Vec<RowRepair>,
    pub dropped: Vec<DroppedRow>,
}

impl ValidationReport {
    pub fn dropped_by(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }

    pub fn categories_folded(&self) -> usize {
        self.repaired
            .iter()
            .filter(|r| matches!(r.repair, Repair::CategoryToOther(_)))
            .count()
    }
}

pub struct Preprocessed {
    pub transactions: Vec<Transaction>,
    pub report: ValidationReport,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

struct Columns {
    date: usize,
    amount: usize,
    category: usize,
    description: usize,
    payment_method: usize,
    is_fixed: usize,
}

/// Check that every required column is present. Lists all missing names.
pub fn validate_schema(table: &RawTable) -> Result<()> {
    resolve_columns(table).map(|_| ())
}

fn resolve_columns(table: &RawTable) -> Result<Columns> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SpendError::MissingColumns(missing));
    }
    let idx = |name: &str| table.column_index(name).unwrap_or_default();
    Ok(Columns {
        date: idx("date"),
        amount: idx("amount"),
        category: idx("category"),
        description: idx("description"),
        payment_method: idx("payment_method"),
        is_fixed: idx("is_fixed"),
    })
}

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

pub fn parse_date(field: &Field) -> Option<NaiveDate> {
    match field {
        Field::Date(d) => Some(*d),
        Field::Number(n) => excel_serial_to_date(*n),
        Field::Text(s) => parse_date_str(s),
        Field::Empty | Field::Bool(_) => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M",
        "%Y.%m.%d %H:%M:%S%.f",
        "%Y.%m.%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

pub fn parse_amount(field: &Field) -> Option<f64> {
    let value = match field {
        Field::Number(n) => *n,
        Field::Text(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('원')
                .chars()
                .filter(|c| !matches!(c, ',' | '₩' | ' ' | '"'))
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        Field::Empty | Field::Bool(_) | Field::Date(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// `Ok(flag)` for a recognized value, `Err(original)` for a token that had to
/// be coerced. Blank cells are handled by the caller.
fn parse_fixed(field: &Field) -> std::result::Result<bool, String> {
    match field {
        Field::Bool(b) => Ok(*b),
        Field::Number(n) => Ok(*n != 0.0),
        Field::Text(s) => {
            let token = s.trim().to_lowercase();
            if TRUTHY.contains(&token.as_str()) {
                Ok(true)
            } else if FALSY.contains(&token.as_str()) {
                Ok(false)
            } else if let Ok(n) = token.parse::<f64>() {
                Ok(n != 0.0)
            } else {
                Err(s.clone())
            }
        }
        Field::Date(d) => Err(d.to_string()),
        Field::Empty => Ok(false),
    }
}

fn field_text(field: &Field) -> String {
    match field {
        Field::Empty => String::new(),
        Field::Text(s) => s.trim().to_string(),
        Field::Number(n) => n.to_string(),
        Field::Bool(b) => b.to_string(),
        Field::Date(d) => d.to_string(),
    }
}

// ---------------------------------------------------------------------------
// preprocess
// ---------------------------------------------------------------------------

/// Validate the schema, then clean every row: drop rows with a bad date or a
/// non-positive amount, fold unknown categories into 기타, fill defaults, and
/// derive the year-month key. Bad rows never fail the whole table.
pub fn preprocess(table: &RawTable) -> Result<Preprocessed> {
    let cols = resolve_columns(table)?;
    let mut report = ValidationReport {
        input_rows: table.rows.len(),
        ..Default::default()
    };
    let mut transactions = Vec::with_capacity(table.rows.len());

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY);

        let Some(date) = parse_date(cell(cols.date)) else {
            report.dropped.push(DroppedRow {
                row: row_no,
                reason: DropReason::InvalidDate,
            });
            continue;
        };
        let Some(amount) = parse_amount(cell(cols.amount)) else {
            report.dropped.push(DroppedRow {
                row: row_no,
                reason: DropReason::InvalidAmount,
            });
            continue;
        };
        if amount <= 0.0 {
            report.dropped.push(DroppedRow {
                row: row_no,
                reason: DropReason::NonPositiveAmount,
            });
            continue;
        }

        let raw_category = field_text(cell(cols.category));
        let category = match Category::from_label(&raw_category) {
            Some(c) => c,
            None => {
                report.repaired.push(RowRepair {
                    row: row_no,
                    repair: Repair::CategoryToOther(raw_category),
                });
                Category::Other
            }
        };

        let description = if cell(cols.description).is_blank() {
            report.repaired.push(RowRepair {
                row: row_no,
                repair: Repair::DescriptionFilled,
            });
            DEFAULT_DESCRIPTION.to_string()
        } else {
            field_text(cell(cols.description))
        };

        let fixed_cell = cell(cols.is_fixed);
        let is_fixed = if fixed_cell.is_blank() {
            report.repaired.push(RowRepair {
                row: row_no,
                repair: Repair::FixedFlagFilled,
            });
            false
        } else {
            match parse_fixed(fixed_cell) {
                Ok(flag) => flag,
                Err(original) => {
                    report.repaired.push(RowRepair {
                        row: row_no,
                        repair: Repair::FixedFlagCoerced(original),
                    });
                    false
                }
            }
        };

        transactions.push(Transaction {
            year_month: date.format("%Y-%m").to_string(),
            date,
            amount,
            category,
            description,
            payment_method: field_text(cell(cols.payment_method)),
            is_fixed,
        });
    }

    report.kept = transactions.len();
    for dropped in &report.dropped {
        debug!(row = dropped.row, reason = dropped.reason.describe(), "dropped row");
    }
    info!(
        input = report.input_rows,
        kept = report.kept,
        dropped = report.dropped.len(),
        repaired = report.repaired.len(),
        "preprocessed table"
    );
    Ok(Preprocessed { transactions, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[&str; 6]]) -> RawTable {
        RawTable {
            headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| Field::text(v)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_scenario_drops_and_folds() {
        let raw = table(&[
            ["2024-01-05", "10000", "식비", "점심", "카드", "False"],
            ["bad", "5000", "식비", "", "카드", "False"],
            ["2024-01-10", "-100", "식비", "", "카드", "False"],
            ["2024-01-15", "20000", "알수없음", "", "카드", ""],
        ]);
        let out = preprocess(&raw).unwrap();
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.transactions[0].amount, 10000.0);
        assert_eq!(out.transactions[0].category, Category::Food);
        assert_eq!(out.transactions[1].amount, 20000.0);
        assert_eq!(out.transactions[1].category, Category::Other);
        assert_eq!(out.transactions[1].description, DEFAULT_DESCRIPTION);
        assert!(!out.transactions[1].is_fixed);
        assert_eq!(out.transactions[1].year_month, "2024-01");

        assert_eq!(out.report.input_rows, 4);
        assert_eq!(out.report.kept, 2);
        assert_eq!(out.report.dropped_by(DropReason::InvalidDate), 1);
        assert_eq!(out.report.dropped_by(DropReason::NonPositiveAmount), 1);
        assert_eq!(out.report.categories_folded(), 1);
        assert_eq!(out.report.dropped[0].row, 2);
        assert_eq!(out.report.dropped[1].row, 3);
    }

    #[test]
    fn test_invariants_hold_for_every_row() {
        let raw = table(&[
            ["2024-03-01", "0", "카페", "", "", ""],
            ["2024-03-02", "abc", "카페", "", "", ""],
            ["2024-03-03", "4,500", "카페", "라떼", "카드", "1"],
            ["2024-03-04", "₩12,000", "쇼핑 ", "", "", "yes"],
            ["2024/03/05", "3000원", "Food", "", "", "no"],
        ]);
        let out = preprocess(&raw).unwrap();
        assert_eq!(out.transactions.len(), 3);
        for t in &out.transactions {
            assert!(t.amount > 0.0);
            assert!(Category::ALL.contains(&t.category));
        }
        assert_eq!(out.transactions[0].amount, 4500.0);
        assert!(out.transactions[0].is_fixed);
        assert_eq!(out.transactions[1].category, Category::Shopping);
        assert_eq!(out.transactions[2].category, Category::Other);
        assert_eq!(out.report.dropped_by(DropReason::InvalidAmount), 1);
        assert_eq!(out.report.kept + out.report.dropped.len(), out.report.input_rows);
    }

    #[test]
    fn test_missing_columns_are_all_listed() {
        let raw = RawTable {
            headers: vec!["date".into(), "amount".into(), "memo".into()],
            rows: vec![],
        };
        match preprocess(&raw) {
            Err(SpendError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["category", "description", "payment_method", "is_fixed"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_header_whitespace_is_tolerated() {
        let mut raw = table(&[["2024-01-05", "100", "식비", "a", "b", "0"]]);
        raw.headers[1] = " amount ".into();
        assert!(validate_schema(&raw).is_ok());
    }

    #[test]
    fn test_parse_date_forms() {
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5);
        for raw in [
            "2024-01-05",
            "2024/01/05",
            "2024.01.05",
            "20240105",
            "01/05/2024",
            "2024-01-05 13:45:00",
            "2024-01-05T13:45",
            "2024-01-05T13:45:00+09:00",
            "2024-01-05T00:00:00.000",
            "2024-01-05 13:45:00.250",
        ] {
            assert_eq!(parse_date_str(raw), jan5, "failed on {raw}");
        }
        assert_eq!(parse_date_str("bad"), None);
        assert_eq!(parse_date_str("2024-02-30"), None);
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date(&Field::Number(45296.0)), jan5);
    }

    #[test]
    fn test_out_of_range_serial_date_drops_row() {
        let raw = RawTable {
            headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: vec![
                vec![
                    Field::Number(1e12),
                    Field::Number(5000.0),
                    Field::text("식비"),
                    Field::text("점심"),
                    Field::text("카드"),
                    Field::Bool(false),
                ],
                vec![
                    Field::Number(45296.0),
                    Field::Number(7000.0),
                    Field::text("식비"),
                    Field::text("저녁"),
                    Field::text("카드"),
                    Field::Bool(false),
                ],
            ],
        };
        let out = preprocess(&raw).unwrap();
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.report.dropped_by(DropReason::InvalidDate), 1);
        assert_eq!(out.report.dropped[0].row, 1);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&Field::text("1,234")), Some(1234.0));
        assert_eq!(parse_amount(&Field::text(" 500 ")), Some(500.0));
        assert_eq!(parse_amount(&Field::text("8,900원")), Some(8900.0));
        assert_eq!(parse_amount(&Field::text("-100")), Some(-100.0));
        assert_eq!(parse_amount(&Field::text("NaN")), None);
        assert_eq!(parse_amount(&Field::text("n/a")), None);
        assert_eq!(parse_amount(&Field::Empty), None);
        assert_eq!(parse_amount(&Field::Number(42.5)), Some(42.5));
    }

    #[test]
    fn test_fixed_flag_coercion() {
        let raw = table(&[
            ["2024-01-01", "100", "구독", "넷플릭스", "카드", "True"],
            ["2024-01-02", "100", "구독", "멜론", "카드", "고정"],
            ["2024-01-03", "100", "식비", "편의점", "카드", "maybe"],
            ["2024-01-04", "100", "식비", "편의점", "카드", "0"],
        ]);
        let out = preprocess(&raw).unwrap();
        let flags: Vec<bool> = out.transactions.iter().map(|t| t.is_fixed).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert_eq!(
            out.report.repaired,
            vec![RowRepair {
                row: 3,
                repair: Repair::FixedFlagCoerced("maybe".into()),
            }]
        );
    }

    #[test]
    fn test_preprocess_is_idempotent_on_clean_data() {
        let raw = table(&[
            ["2024-01-05", "10000", "식비", "점심", "카드", "False"],
            ["2024-02-11", "55000", "쇼핑", "", "현금", "True"],
            ["2024-02-15", "20000", "미분류", "택시", "카드", ""],
        ]);
        let first = preprocess(&raw).unwrap();
        let again = preprocess(&RawTable::from_transactions(&first.transactions)).unwrap();
        assert_eq!(first.transactions, again.transactions);
        assert!(again.report.dropped.is_empty());
        assert!(again.report.repaired.is_empty());
    }
}
