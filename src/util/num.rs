/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;
/// Largest signed integer exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_I64_INT: i64 = 9_007_199_254_740_991;

/// Converts an `f64` to `i64` if the value is finite, integral and exactly
/// representable.
///
/// # Parameters
/// - `value`: The floating-point value to convert.
///
/// # Returns
/// - `Some(i64)`: The converted value if safe.
/// - `None`: For non-finite, fractional or out-of-range values.
///
/// # Example
/// ```
/// use kll::util::num::f64_to_i64_checked;
///
/// assert_eq!(f64_to_i64_checked(1000.0), Some(1000));
/// assert_eq!(f64_to_i64_checked(-3.0), Some(-3));
/// assert_eq!(f64_to_i64_checked(1.5), None);
/// assert_eq!(f64_to_i64_checked(1e20), None);
/// assert_eq!(f64_to_i64_checked(f64::NAN), None);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn f64_to_i64_checked(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_SAFE_I64_INT as f64 {
        return None;
    }
    Some(value as i64)
}

/// Converts a `usize` to `f64`, saturating at [`MAX_SAFE_U64_INT`].
///
/// # Example
/// ```
/// use kll::util::num::usize_to_f64_saturating;
///
/// assert_eq!(usize_to_f64_saturating(12), 12.0);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn usize_to_f64_saturating(value: usize) -> f64 {
    u64::try_from(value).map_or(MAX_SAFE_U64_INT, |v| v.min(MAX_SAFE_U64_INT)) as f64
}

/// Converts a replacement limit to a count.
///
/// Zero, negative and non-finite limits mean "no limit" and return `None`;
/// positive limits are truncated towards zero.
///
/// # Example
/// ```
/// use kll::util::num::f64_to_limit;
///
/// assert_eq!(f64_to_limit(2.7), Some(2));
/// assert_eq!(f64_to_limit(0.0), None);
/// assert_eq!(f64_to_limit(-1.0), None);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn f64_to_limit(value: f64) -> Option<usize> {
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    let value = value.min(MAX_SAFE_U64_INT as f64).trunc() as u64;
    usize::try_from(value).ok()
}

/// Formats a number the way kll displays it.
///
/// Integral values print without a decimal point, other finite values use
/// the shortest representation that round-trips, and non-finite values print
/// as `+Inf`, `-Inf` or `NaN`.
///
/// # Example
/// ```
/// use kll::util::num::format_number;
///
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(-2.5), "-2.5");
/// assert_eq!(format_number(1.0 / 0.0), "+Inf");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    f64_to_i64_checked(value).map_or_else(|| value.to_string(), |int| int.to_string())
}
