/// Format a number with thousands separators and no decimals: 1,234,567
pub fn number(val: f64) -> String {
    let rounded = val.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}")
    } else {
        with_commas
    }
}

/// Format a won amount: 1,234원
pub fn won(val: f64) -> String {
    format!("{}원", number(val))
}

/// Compact axis label: 1.2M, 350K, 900
pub fn format_k(val: f64) -> String {
    if val >= 1_000_000.0 {
        format!("{:.1}M", val / 1_000_000.0)
    } else if val >= 1_000.0 {
        format!("{:.0}K", val / 1_000.0)
    } else {
        format!("{val:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1234567.0), "1,234,567");
        assert_eq!(number(999.0), "999");
        assert_eq!(number(0.0), "0");
        assert_eq!(number(-45000.0), "-45,000");
        assert_eq!(number(1499.6), "1,500");
    }

    #[test]
    fn test_won_formatting() {
        assert_eq!(won(30000.0), "30,000원");
        assert_eq!(won(15000.4), "15,000원");
    }

    #[test]
    fn test_format_k() {
        assert_eq!(format_k(2_500_000.0), "2.5M");
        assert_eq!(format_k(350_000.0), "350K");
        assert_eq!(format_k(900.0), "900");
    }
}
