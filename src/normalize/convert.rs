// src/normalize/convert.rs
use arrow::array::{Float64Array, Float64Builder, Int64Array, Int64Builder};

/// Trim whitespace and strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Numeric coercion: anything that does not parse to a finite `f64` is missing.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let c = clean_str(raw);
    if c.is_empty() {
        return None;
    }
    c.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Year coercion: a number with no fractional part, e.g. `2022` or `2022.0`.
pub fn coerce_year(raw: &str) -> Option<i64> {
    let c = clean_str(raw);
    if let Ok(y) = c.parse::<i64>() {
        return Some(y);
    }
    coerce_number(c)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Build a nullable Float64 column from raw cells.
pub fn numeric_column<'a, I>(cells: I) -> Float64Array
where
    I: IntoIterator<Item = &'a str>,
{
    let mut b = Float64Builder::new();
    for cell in cells {
        b.append_option(coerce_number(cell));
    }
    b.finish()
}

pub fn year_column<I>(years: I) -> Int64Array
where
    I: IntoIterator<Item = Option<i64>>,
{
    let mut b = Int64Builder::new();
    for y in years {
        b.append_option(y);
    }
    b.finish()
}
