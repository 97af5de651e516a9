//! Display-only currency formatting.
//!
//! Indian digit grouping: the last three integer digits form one group,
//! every group above that has two digits (1,50,000.00). This affects
//! presentation only, never the stored amounts.

use rust_decimal::Decimal;

/// Format an amount with en-IN grouping and exactly two decimal places.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).abs();
    let fixed = format!("{:.2}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (idx, ch) in digits.iter().enumerate() {
        let remaining = digits.len() - idx;
        if idx > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}
