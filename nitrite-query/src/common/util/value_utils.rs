use crate::common::value::cmp_numbers;
use crate::common::Value;
use std::cmp::Ordering;

/// Compares two values for filtering and sorting purposes.
///
/// Only values of compatible kinds have an order: numbers with numbers,
/// strings and chars with each other, booleans with booleans and ids with
/// ids. Everything else is incomparable and yields `None`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let Some(ordering) = cmp_numbers(a, b) {
        return Some(ordering);
    }

    match (a, b) {
        (Value::String(_) | Value::Char(_), Value::String(_) | Value::Char(_)) => Some(a.cmp(b)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::NitriteId(x), Value::NitriteId(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Returns the text of a string or char value.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

/// Checks if `value` equals `target`, or if `value` is an array, whether any
/// of its elements does.
pub fn equals_or_contains(value: &Value, target: &Value) -> bool {
    if value == target {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(|item| item == target),
        _ => false,
    }
}

/// Applies `predicate` to `value`, or to every element when `value` is an
/// array, succeeding if any application does.
pub fn any_element<F>(value: &Value, mut predicate: F) -> bool
where
    F: FnMut(&Value) -> bool,
{
    match value {
        Value::Array(items) => items.iter().any(predicate),
        _ => predicate(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_comparable_across_kinds() {
        assert_eq!(compare_values(&Value::I32(1), &Value::F64(1.5)), Some(Ordering::Less));
        assert_eq!(compare_values(&Value::U64(2), &Value::I8(2)), Some(Ordering::Equal));
    }

    #[test]
    fn mixed_kinds_are_incomparable() {
        assert_eq!(compare_values(&Value::I32(1), &Value::from("1")), None);
        assert_eq!(compare_values(&Value::Null, &Value::I32(1)), None);
        assert_eq!(compare_values(&Value::from(vec![1]), &Value::I32(1)), None);
        assert_eq!(compare_values(&Value::Bool(true), &Value::I32(1)), None);
    }

    #[test]
    fn text_comparison() {
        assert_eq!(
            compare_values(&Value::from("abc"), &Value::from("abd")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&Value::Char('b'), &Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(text_of(&Value::Char('x')), Some("x".to_string()));
        assert_eq!(text_of(&Value::I32(1)), None);
    }

    #[test]
    fn array_membership() {
        let array = Value::from(vec![1, 2, 3]);
        assert!(equals_or_contains(&array, &Value::I64(2)));
        assert!(equals_or_contains(&array, &Value::from(vec![1, 2, 3])));
        assert!(!equals_or_contains(&array, &Value::I32(4)));
        assert!(any_element(&array, |v| v == &Value::I32(3)));
        assert!(any_element(&Value::I32(3), |v| v == &Value::I32(3)));
    }
}
