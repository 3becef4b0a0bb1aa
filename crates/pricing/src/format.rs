//! Display formatting for derived amounts.
//!
//! Amount tokens render with thousands separators; percentages render
//! bare. Formatting never loses precision: the fractional part, when
//! present, is carried through unchanged.

use rust_decimal::Decimal;

/// Format an amount with thousands separators: `15000` → `"15,000"`,
/// `12345.5` → `"12,345.5"`. Trailing fractional zeros are dropped.
pub fn format_amount(value: Decimal) -> String {
    let normalized = value.normalize();
    let raw = normalized.to_string();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Format a percentage value without separators or trailing zeros.
pub fn format_percent(value: Decimal) -> String {
    value.normalize().to_string()
}
