//! Indian number formatting (12,34,567)

/// Group digits the Indian way: last three, then pairs.
pub fn format_indian(amount: f64, show_decimals: bool) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (integer, decimals) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, digit) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    if show_decimals {
        format!("{}{}.{}", sign, grouped, decimals)
    } else {
        format!("{}{}", sign, grouped)
    }
}

/// Rupee amount without decimals, e.g. "₹51,237"
pub fn format_inr(amount: i64) -> String {
    format!("₹{}", format_indian(amount as f64, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_indian(1234567.89, true), "12,34,567.89");
        assert_eq!(format_indian(999.0, true), "999.00");
        assert_eq!(format_indian(1000.0, false), "1,000");
        assert_eq!(format_indian(100000.0, false), "1,00,000");
        assert_eq!(format_indian(0.0, false), "0");
        assert_eq!(format_indian(-12345.0, false), "-12,345");
        assert_eq!(format_indian(f64::NAN, true), "0");
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(51237), "₹51,237");
        assert_eq!(format_inr(12345678), "₹1,23,45,678");
    }
}
