/// Coerces numeric field text into an integer.
///
/// Blank text is `0`, fractional values truncate toward zero, and anything
/// that is not a finite number yields `None` so callers keep the previous
/// value. Negative values pass through unchanged.
///
/// # Example
/// ```
/// use engine::coerce_number;
///
/// assert_eq!(coerce_number(" 42 "), Some(42));
/// assert_eq!(coerce_number(""), Some(0));
/// assert_eq!(coerce_number("-2.9"), Some(-2));
/// assert_eq!(coerce_number("abc"), None);
/// ```
pub fn coerce_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some(value.trunc() as i64)
}
