//! Best-effort conversion of spreadsheet text into numbers.
//!
//! Cells that cannot be read as a number become `None` ("missing") rather
//! than an error; sums skip them.

fn strip_non_numeric(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Coerce one time-series cell.
///
/// Blank cells and a lone `-` count as zero. Everything else is stripped to
/// digits, `.` and `-` and parsed; text with no digits at all (`N/A`) or a
/// malformed remainder (`1.2.3`, `--5`) is missing.
pub fn coerce_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return Some(0.0);
    }
    let cleaned = strip_non_numeric(s);
    if cleaned == "-" {
        return Some(0.0);
    }
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn coerce_column<'a, I>(cells: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    cells.into_iter().map(coerce_cell).collect()
}

/// Strict variant used on the itemized table: strip, then parse. Blank and
/// dash-only cells are missing here, so an empty column never looks numeric.
pub fn parse_stripped(raw: &str) -> Option<f64> {
    strip_non_numeric(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Sum the present values. `None` when nothing was present (minimum count of one).
pub fn sum_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// `sum_present`, reporting an all-missing input as zero.
pub fn sum_or_zero<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    sum_present(values).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_clean_numbers() {
        assert_eq!(coerce_cell("1234.50"), Some(1234.5));
        assert_eq!(coerce_cell("-42"), Some(-42.0));
        assert_eq!(coerce_cell("0.25"), Some(0.25));
        assert_eq!(coerce_cell("  7  "), Some(7.0));
    }

    #[test]
    fn test_coerce_strips_formatting() {
        assert_eq!(coerce_cell("$1,234.56"), Some(1234.56));
        assert_eq!(coerce_cell("\"2,000.00\""), Some(2000.0));
        assert_eq!(coerce_cell("-$50.00"), Some(-50.0));
        assert_eq!(coerce_cell("1 000 000"), Some(1_000_000.0));
    }

    #[test]
    fn test_coerce_dash_and_blank_are_zero() {
        assert_eq!(coerce_cell("-"), Some(0.0));
        assert_eq!(coerce_cell("  -  "), Some(0.0));
        assert_eq!(coerce_cell(""), Some(0.0));
        assert_eq!(coerce_cell("   "), Some(0.0));
        assert_eq!(coerce_cell("$-"), Some(0.0));
    }

    #[test]
    fn test_coerce_non_numeric_is_missing() {
        assert_eq!(coerce_cell("N/A"), None);
        assert_eq!(coerce_cell("bad"), None);
        assert_eq!(coerce_cell("1.2.3"), None);
        assert_eq!(coerce_cell("--5"), None);
        assert_eq!(coerce_cell("5-5"), None);
    }

    #[test]
    fn test_coerce_column_keeps_length() {
        let out = coerce_column(["100", "-", "bad", ""]);
        assert_eq!(out, vec![Some(100.0), Some(0.0), None, Some(0.0)]);
    }

    #[test]
    fn test_parse_stripped_blank_is_missing() {
        assert_eq!(parse_stripped(""), None);
        assert_eq!(parse_stripped("-"), None);
        assert_eq!(parse_stripped("Fire"), None);
        assert_eq!(parse_stripped("$500"), Some(500.0));
        assert_eq!(parse_stripped("(1,234.56)"), Some(1234.56));
    }

    #[test]
    fn test_sum_present_min_count() {
        assert_eq!(sum_present(vec![None, None]), None);
        assert_eq!(sum_present(Vec::<Option<f64>>::new()), None);
        assert_eq!(sum_present(vec![Some(1.5), None, Some(2.0)]), Some(3.5));
        assert_eq!(sum_or_zero(vec![None]), 0.0);
    }
}
