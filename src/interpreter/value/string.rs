use std::rc::Rc;

use crate::{
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            core::Value,
            function::{Kwargs, NativeFunction, number_argument, text_argument},
        },
    },
    util::num::{f64_to_limit, usize_to_f64_saturating},
};

/// Reads an attribute of a string.
///
/// `number` and `length` are plain values. `replace`, `startswith` and
/// `endswith` are callables bound to the receiving string; they accept their
/// arguments positionally or by name:
///
/// - `replace(old, new, limit)` replaces the first `limit` occurrences, or
///   all of them when `limit` is missing or not positive.
/// - `startswith(value)` / `endswith(value)` test a prefix or suffix.
///
/// Unknown attributes are `Null`.
///
/// # Example
/// ```
/// use kll::interpreter::value::{core::Value, string::string_attribute};
///
/// assert_eq!(string_attribute("12.5", "number"), Value::Number(12.5));
/// assert_eq!(string_attribute("abc", "number"), Value::Number(0.0));
/// assert_eq!(string_attribute("abc", "length"), Value::Number(3.0));
/// ```
#[must_use]
pub fn string_attribute(text: &str, name: &str) -> Value {
    match name {
        "number" => Value::Number(text.trim().parse().unwrap_or(0.0)),
        "length" => Value::Number(usize_to_f64_saturating(text.chars().count())),
        "replace" => bound(text, |receiver, args, kwargs| {
            let old = text_argument(args, kwargs, 0, "old");
            let new = text_argument(args, kwargs, 1, "new");
            let limit = number_argument(args, kwargs, 2, "limit")?;
            Ok(Value::Str(replace(receiver, &old, &new, f64_to_limit(limit))))
        }),
        "startswith" => bound(text, |receiver, args, kwargs| {
            Ok(Value::Bool(receiver.starts_with(&text_argument(args, kwargs, 0, "value"))))
        }),
        "endswith" => bound(text, |receiver, args, kwargs| {
            Ok(Value::Bool(receiver.ends_with(&text_argument(args, kwargs, 0, "value"))))
        }),
        _ => Value::Null,
    }
}

/// Wraps `method` into a native function that receives `text` as its
/// receiver.
fn bound<F>(text: &str, method: F) -> Value
    where F: Fn(&str, &[Value], &Kwargs) -> EvalResult<Value> + 'static
{
    let receiver: Rc<str> = Rc::from(text);
    Value::Native(NativeFunction::new(move |args, kwargs, _| method(&receiver, args, kwargs)))
}

/// Replaces up to `limit` occurrences of `old`, or all of them when `limit`
/// is `None`.
///
/// An empty `old` matches before every character and at the end, so
/// `replace("ab", "", "-", None)` is `"-a-b-"`.
fn replace(text: &str, old: &str, new: &str, limit: Option<usize>) -> String {
    match limit {
        None => text.replace(old, new),
        Some(limit) => text.replacen(old, new, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::function::KeywordArg;

    fn call(method: &Value, args: &[Value], named: &[(&str, Value)]) -> Value {
        let kwargs = named.iter()
                          .map(|(name, value)| {
                              ((*name).to_string(),
                               KeywordArg { name:  (*name).to_string(),
                                            value: value.clone(), })
                          })
                          .collect::<Kwargs>();
        let Value::Native(native) = method else {
            panic!("expected a native function, got {method}");
        };
        native.call(args, &kwargs, 0).unwrap()
    }

    fn text(value: &str) -> Value {
        Value::Str(value.to_string())
    }

    #[test]
    fn replace_all_by_default() {
        let method = string_attribute("aaa", "replace");
        assert_eq!(call(&method, &[text("a"), text("b")], &[]), text("bbb"));
        assert_eq!(call(&method, &[text("a"), text("b"), Value::Number(0.0)], &[]),
                   text("bbb"));
    }

    #[test]
    fn replace_with_limit_and_names() {
        let method = string_attribute("aaa", "replace");
        let named = [("old", text("a")), ("new", text("z")), ("limit", Value::Number(2.0))];
        assert_eq!(call(&method, &[], &named), text("zza"));
    }

    #[test]
    fn prefix_and_suffix() {
        let starts = string_attribute("hello", "startswith");
        let ends = string_attribute("hello", "endswith");
        assert_eq!(call(&starts, &[text("he")], &[]), Value::Bool(true));
        assert_eq!(call(&starts, &[], &[("value", text("lo"))]), Value::Bool(false));
        assert_eq!(call(&ends, &[], &[("value", text("lo"))]), Value::Bool(true));
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(string_attribute("ção", "length"), Value::Number(3.0));
        assert_eq!(string_attribute("x", "missing"), Value::Null);
    }
}
