use std::io::Write;

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::preprocess::REQUIRED_COLUMNS;

pub const SAMPLE_FILE_NAME: &str = "sample_expense_data_300.csv";

struct Merchant {
    category: &'static str,
    description: &'static str,
    min: u32,
    max: u32,
}

const fn merchant(
    category: &'static str,
    description: &'static str,
    min: u32,
    max: u32,
) -> Merchant {
    Merchant {
        category,
        description,
        min,
        max,
    }
}

const MERCHANTS: &[Merchant] = &[
    merchant("식비", "김밥천국", 4_000, 12_000),
    merchant("식비", "배달의민족", 15_000, 40_000),
    merchant("식비", "이마트", 20_000, 120_000),
    merchant("교통비", "지하철", 1_400, 1_400),
    merchant("교통비", "카카오T 택시", 6_000, 30_000),
    merchant("카페", "스타벅스", 4_500, 9_000),
    merchant("카페", "메가커피", 2_000, 4_500),
    merchant("쇼핑", "쿠팡", 9_000, 150_000),
    merchant("쇼핑", "무신사", 30_000, 200_000),
    merchant("의료/건강", "약국", 3_000, 25_000),
    merchant("문화/여가", "CGV", 14_000, 30_000),
    merchant("교육", "온라인 강의", 30_000, 150_000),
];

/// Monthly bills: (day of month, category, description, amount).
const FIXED: &[(u32, &str, &str, u32)] = &[
    (1, "주거/통신", "월세", 550_000),
    (10, "주거/통신", "휴대폰 요금", 65_000),
    (15, "구독", "넷플릭스", 17_000),
    (15, "구독", "유튜브 프리미엄", 14_900),
];

const PAYMENT_METHODS: &[&str] = &["신용카드", "체크카드", "현금", "계좌이체"];

/// Write a synthetic expense sheet with the required columns. Roughly one row
/// in fifty is deliberately dirty (bad date, refund, unknown category, blank
/// description) so the cleaning step has something to do.
pub fn write_sample_csv<W: Write>(out: W, rows: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(REQUIRED_COLUMNS)?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    // Spread rows over three months.
    let span_days = 90;
    let mut records: Vec<(NaiveDate, [String; 6])> = Vec::with_capacity(rows);

    let mut month = 0;
    while records.len() < rows && month < 3 {
        for (day, category, description, amount) in FIXED {
            if records.len() >= rows {
                break;
            }
            let Some(date) = start
                .checked_add_months(chrono::Months::new(month))
                .and_then(|m| m.with_day(*day))
            else {
                continue;
            };
            records.push((
                date,
                [
                    date.format("%Y-%m-%d").to_string(),
                    amount.to_string(),
                    category.to_string(),
                    description.to_string(),
                    "자동이체".to_string(),
                    "True".to_string(),
                ],
            ));
        }
        month += 1;
    }

    while records.len() < rows {
        let date = start + Duration::days(rng.gen_range(0..span_days));
        let merchant = &MERCHANTS[rng.gen_range(0..MERCHANTS.len())];
        let amount = if merchant.min == merchant.max {
            merchant.min
        } else {
            rng.gen_range(merchant.min..=merchant.max) / 100 * 100
        };
        let payment = PAYMENT_METHODS.choose(&mut rng).copied().unwrap_or("현금");
        let mut record = [
            date.format("%Y-%m-%d").to_string(),
            amount.to_string(),
            merchant.category.to_string(),
            merchant.description.to_string(),
            payment.to_string(),
            "False".to_string(),
        ];
        if rng.gen_bool(0.02) {
            match rng.gen_range(0..4) {
                0 => record[0] = "날짜 없음".to_string(),
                1 => record[1] = format!("-{amount}"),
                2 => record[2] = "미분류".to_string(),
                _ => record[3] = String::new(),
            }
        }
        records.push((date, record));
    }

    records.sort_by_key(|(date, _)| *date);
    for (_, record) in &records {
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    Ok(())
}
