//! Value formatting for node cards and tooltips.

use decomp_engine::MetricKind;
use serde::{Deserialize, Serialize};

/// How a node's metric value is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Signed percentage with one decimal: "+12.5%", "-3.0%".
    Percent,

    /// Dollar amount with magnitude suffixes: "$1.2B", "$3.4M", "$56.0K",
    /// "$423".
    Currency,

    /// Plain number with the same magnitude suffixes, no symbol.
    Number,
}

impl ValueFormat {
    /// Default rendering for each metric kind. Hosts may override when a
    /// column's unit says otherwise (a weighted average of a dollar column,
    /// say).
    pub fn for_metric(metric: &MetricKind) -> Self {
        match metric {
            MetricKind::Growth { .. } => ValueFormat::Percent,
            MetricKind::Sum { .. } => ValueFormat::Currency,
            MetricKind::Mean { .. } | MetricKind::WeightedAverage { .. } => ValueFormat::Number,
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        match self {
            ValueFormat::Percent => {
                let sign = if value >= 0.0 { "+" } else { "" };
                format!("{}{:.1}%", sign, value)
            }
            ValueFormat::Currency => format_magnitude(value, "$"),
            ValueFormat::Number => format_magnitude(value, ""),
        }
    }
}

/// Magnitude-suffixed rendering. The thresholds are on the raw value, so
/// negative amounts always take the exact path.
fn format_magnitude(value: f64, symbol: &str) -> String {
    if value >= 1e9 {
        format!("{}{:.1}B", symbol, value / 1e9)
    } else if value >= 1e6 {
        format!("{}{:.1}M", symbol, value / 1e6)
    } else if value >= 1e3 {
        format!("{}{:.1}K", symbol, value / 1e3)
    } else {
        format!("{}{}", symbol, add_thousands_separator(&trim_decimal(value)))
    }
}

/// Renders with up to two decimals, trimming trailing zeros.
fn trim_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Adds thousands separators to a numeric string.
pub fn add_thousands_separator(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_signed() {
        assert_eq!(ValueFormat::Percent.format_value(12.5), "+12.5%");
        assert_eq!(ValueFormat::Percent.format_value(0.0), "+0.0%");
        assert_eq!(ValueFormat::Percent.format_value(-3.04), "-3.0%");
    }

    #[test]
    fn test_currency_magnitude_tiers() {
        assert_eq!(ValueFormat::Currency.format_value(2_400_000_000.0), "$2.4B");
        assert_eq!(ValueFormat::Currency.format_value(3_400_000.0), "$3.4M");
        assert_eq!(ValueFormat::Currency.format_value(56_000.0), "$56.0K");
        assert_eq!(ValueFormat::Currency.format_value(423.0), "$423");
    }

    #[test]
    fn test_currency_below_thousand_keeps_decimals() {
        assert_eq!(ValueFormat::Currency.format_value(423.5), "$423.5");
        assert_eq!(ValueFormat::Currency.format_value(-1_500.0), "$-1,500");
    }

    #[test]
    fn test_number_mode_has_no_symbol() {
        assert_eq!(ValueFormat::Number.format_value(75.0), "75");
        assert_eq!(ValueFormat::Number.format_value(56_000.0), "56.0K");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(add_thousands_separator("1234567"), "1,234,567");
        assert_eq!(add_thousands_separator("-1234.56"), "-1,234.56");
        assert_eq!(add_thousands_separator("999"), "999");
    }

    #[test]
    fn test_metric_defaults() {
        assert_eq!(
            ValueFormat::for_metric(&MetricKind::Growth {
                current: "NCC".to_string(),
                prior: "NCC_PY".to_string(),
            }),
            ValueFormat::Percent
        );
        assert_eq!(
            ValueFormat::for_metric(&MetricKind::Sum {
                column: "NCC".to_string()
            }),
            ValueFormat::Currency
        );
        assert_eq!(
            ValueFormat::for_metric(&MetricKind::WeightedAverage {
                value: "OTP".to_string(),
                weight: "Trips".to_string(),
            }),
            ValueFormat::Number
        );
    }
}
