// Utility helpers for parsing, order statistics and number formatting.
//
// This module centralizes the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Outcome of parsing one numeric CSV cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Blank, `NaN` or `NA`: treated as absent.
    Missing,
    Value(f64),
    /// Text that is not a number at all.
    Invalid,
}

/// Parse a production cell while being forgiving about the formatting
/// found in French CSV exports.
///
/// - Trims whitespace, including non-breaking spaces used as thousands
///   separators (`1 234,5`).
/// - When both `.` and `,` appear, the one written last is the decimal
///   mark and the other is a thousands separator (`1.234,5`, `1,234.5`).
/// - A lone comma is a decimal comma; repeated commas are thousands
///   separators.
/// - `NaN`/`NA`/empty map to `Missing`; anything else unparseable or
///   infinite is `Invalid`.
pub fn parse_numeric_cell(s: Option<&str>) -> NumericCell {
    let Some(s) = s else {
        return NumericCell::Missing;
    };
    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if s.is_empty() {
        return NumericCell::Missing;
    }
    if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("na") {
        return NumericCell::Missing;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return NumericCell::Invalid;
    }
    let normalized = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), _) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        _ => s.replace(',', ""),
    };
    match normalized.parse::<f64>() {
        Ok(v) if v.is_nan() => NumericCell::Missing,
        Ok(v) if v.is_finite() => NumericCell::Value(v),
        _ => NumericCell::Invalid,
    }
}

/// Parse a year. Some exports write years as floats (`2020.0`).
pub fn parse_year_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Trimmed, non-empty text or `None`.
pub fn clean_label(s: Option<String>) -> Option<String> {
    let s = s?.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

pub fn sort_floats(v: &mut [f64]) {
    // `partial_cmp` falls back to equality if either side is NaN.
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Quantile of an already-sorted slice with linear interpolation between
/// closest ranks (the NumPy default). `q` is in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `1,248 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
