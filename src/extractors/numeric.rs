// src/extractors/numeric.rs
//! Brazilian-locale number handling: `.` groups thousands, `,` separates decimals.

/// Converts locale-formatted text such as `"1.234,56"` into `1234.56`.
///
/// Never fails: anything that is not a number after normalization comes back
/// as `f64::NAN`, and callers decide what to do with it.
pub fn normalize(text: &str) -> f64 {
    let canonical = text.trim().replace('.', "").replacen(',', ".", 1);
    canonical.parse::<f64>().unwrap_or(f64::NAN)
}

/// Maps NaN and infinities to zero; finite values pass through.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `total / quantity`, or zero when the quantity is zero (or not a number),
/// so one bad row cannot poison the rest of the receipt.
pub fn unit_price(total: f64, quantity: f64) -> f64 {
    if quantity == 0.0 || !quantity.is_finite() {
        0.0
    } else {
        finite_or_zero(total / quantity)
    }
}

/// Fixed-precision decimal string, e.g. `format_fixed(2.0, 4) == "2.0000"`.
pub fn format_fixed(value: f64, digits: usize) -> String {
    let formatted = format!("{:.*}", digits, value);
    // "-0.00" reads as a bogus negative amount
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}
