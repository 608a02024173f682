use crate::{
    interpreter::value::core::Value,
    util::num::{format_number, usize_to_f64_saturating},
};

/// Reads an attribute of a number.
///
/// | Attribute | Result |
/// |-----------|--------|
/// | `string`  | the display string |
/// | `is_int`  | `true` when there is no fractional part |
/// | `length`  | number of digits, ignoring sign and decimal point |
/// | `length1` | digits of the integer part |
/// | `length2` | digits of the fractional part (`0` for integers) |
/// | `decimal` | the fractional part |
/// | `floor`   | the value rounded down |
///
/// Unknown attributes are `Null`.
///
/// # Example
/// ```
/// use kll::interpreter::value::{core::Value, number::number_attribute};
///
/// assert_eq!(number_attribute(12.25, "length"), Value::Number(4.0));
/// assert_eq!(number_attribute(12.25, "length1"), Value::Number(2.0));
/// assert_eq!(number_attribute(12.25, "length2"), Value::Number(2.0));
/// assert_eq!(number_attribute(12.25, "is_int"), Value::Bool(false));
/// assert_eq!(number_attribute(12.0, "nope"), Value::Null);
/// ```
#[must_use]
pub fn number_attribute(value: f64, name: &str) -> Value {
    match name {
        "string" => Value::Str(format_number(value)),
        "is_int" => Value::Bool(value.fract() == 0.0),
        "length" => digit_count(&format_number(value)),
        "length1" => digit_count(&format_number(value.trunc())),
        "length2" => fraction_digits(value),
        "decimal" => Value::Number(value.fract()),
        "floor" => Value::Number(value.floor()),
        _ => Value::Null,
    }
}

fn digit_count(text: &str) -> Value {
    Value::Number(usize_to_f64_saturating(text.chars().filter(char::is_ascii_digit).count()))
}

fn fraction_digits(value: f64) -> Value {
    let text = format_number(value);
    let digits = text.split_once('.').map_or(0, |(_, fraction)| {
                                          fraction.chars().filter(char::is_ascii_digit).count()
                                      });
    Value::Number(usize_to_f64_saturating(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(number_attribute(120.0, "string"), Value::Str("120".to_string()));
        assert_eq!(number_attribute(120.0, "is_int"), Value::Bool(true));
        assert_eq!(number_attribute(120.0, "length2"), Value::Number(0.0));
        assert_eq!(number_attribute(-120.0, "length"), Value::Number(3.0));
    }

    #[test]
    fn fractions() {
        assert_eq!(number_attribute(3.5, "decimal"), Value::Number(0.5));
        assert_eq!(number_attribute(3.5, "floor"), Value::Number(3.0));
        assert_eq!(number_attribute(-3.5, "floor"), Value::Number(-4.0));
        assert_eq!(number_attribute(0.125, "length1"), Value::Number(1.0));
        assert_eq!(number_attribute(0.125, "length2"), Value::Number(3.0));
    }
}
