//! Number formatting shared by the report and chart axes.

/// Format with `,` thousands separators and a fixed number of decimals.
pub fn with_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `$1,234.50`
pub fn currency(value: f64) -> String {
    format!("${}", with_thousands(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(with_thousands(0.0, 2), "0.00");
        assert_eq!(with_thousands(999.5, 2), "999.50");
        assert_eq!(with_thousands(1000.0, 0), "1,000");
        assert_eq!(with_thousands(2_261_536.7827, 2), "2,261,536.78");
        assert_eq!(with_thousands(-12345.0, 1), "-12,345.0");
        assert_eq!(with_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(40.0), "$40.00");
        assert_eq!(currency(728_658.5757), "$728,658.58");
        assert_eq!(currency(f64::NAN), "$NaN");
    }
}
