/// Format a value as dollars with thousands separators: `$1,234.56`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

/// Signed percentage with one decimal, `None` when there is nothing to compare against
pub fn format_delta(delta: Option<f64>) -> Option<String> {
    delta.map(|d| format!("{:+.1}%", d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.5), "$5.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.1), "-$42.10");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(Some(12.345)), Some("+12.3%".to_string()));
        assert_eq!(format_delta(Some(-4.0)), Some("-4.0%".to_string()));
        assert_eq!(format_delta(None), None);
    }
}
