use crate::coerce::parse_stripped;

/// Format a float as a dollar amount with thousands separators: $1,234.56
/// Anything that rounds to zero cents renders as `$0.00`.
pub fn money(val: f64) -> String {
    if !val.is_finite() {
        return "$0.00".to_string();
    }
    let cents = format!("{:.2}", val.abs());
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts.get(1).copied().unwrap_or("00");

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let is_zero = cents.chars().all(|c| c == '0' || c == '.');
    if val < 0.0 && !is_zero {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Read back a string produced by `money`.
#[allow(dead_code)]
pub fn parse_money(s: &str) -> Option<f64> {
    parse_stripped(s)
}
