//! Total conversions from loose cell values into the numbers and labels chart paths need.
//!
//! Nothing in here can fail: spreadsheet content is untrusted, and a chart with
//! zeros or blank labels is preferred over no chart at all.

use crate::data::Value;

/// Bucket name for categorical aggregation when the category cell is empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Numeric value of a cell, or `None` if it has no finite numeric reading.
pub fn to_number_opt(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => *n,
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Missing => return None,
    };
    n.is_finite().then_some(n)
}

/// Numeric value of a cell with `0` as the fallback.
pub fn to_number(value: &Value) -> f64 {
    to_number_opt(value).unwrap_or(0.0)
}

/// Display label of a cell; missing or empty cells produce `fallback`.
pub fn to_label(value: &Value, fallback: &str) -> String {
    match value {
        Value::Missing => fallback.to_string(),
        Value::Text(s) if s.is_empty() => fallback.to_string(),
        Value::Text(s) => s.clone(),
        Value::Number(n) => format_number(*n),
    }
}

/// Shortest readable form: integral values drop the fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_parses_text() {
        assert_eq!(to_number(&Value::from("42")), 42.0);
        assert_eq!(to_number(&Value::from(" -3.5 ")), -3.5);
        assert_eq!(to_number(&Value::from("1e3")), 1000.0);
    }

    #[test]
    fn test_to_number_fallbacks() {
        assert_eq!(to_number(&Value::from("N/A")), 0.0);
        assert_eq!(to_number(&Value::from("")), 0.0);
        assert_eq!(to_number(&Value::Missing), 0.0);
        assert_eq!(to_number(&Value::from("12abc")), 0.0);
    }

    #[test]
    fn test_to_number_rejects_non_finite() {
        assert_eq!(to_number(&Value::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&Value::Number(f64::INFINITY)), 0.0);
        assert_eq!(to_number(&Value::from("inf")), 0.0);
        assert_eq!(to_number(&Value::from("NaN")), 0.0);
        assert_eq!(to_number_opt(&Value::from("-infinity")), None);
    }

    #[test]
    fn test_to_label() {
        assert_eq!(to_label(&Value::from("Jan"), ""), "Jan");
        assert_eq!(to_label(&Value::Missing, UNKNOWN_LABEL), "Unknown");
        assert_eq!(to_label(&Value::from(""), UNKNOWN_LABEL), "Unknown");
        assert_eq!(to_label(&Value::Missing, ""), "");
        assert_eq!(to_label(&Value::Number(2024.0), ""), "2024");
        assert_eq!(to_label(&Value::Number(0.0), UNKNOWN_LABEL), "0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(1.25), "1.25");
    }
}
