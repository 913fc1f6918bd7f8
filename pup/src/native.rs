//! Native function utilities and helpers
//!
//! This module provides the pair/list codec, the runtime type guards, and
//! the constructors used to build curried primitives out of Rust closures.

use std::rc::Rc;

use puppy::{PuppyError, Result};

use crate::interpreter::Interpreter;
use crate::value::{Function, Primitive, Value, ValueKind};

// ============================================================================
// Pair Codec
// ============================================================================

/// Decode a pair-encoded list into its elements.
///
/// The empty list decodes to no elements and any other non-pair value to a
/// single element. An empty list in the last position of a pair, as built by
/// `(list 1 [])`, is an element.
pub fn pairs_to_list(value: &Value) -> Vec<Value> {
    let mut items = Vec::new();
    if let Value::Empty = value {
        return items;
    }
    let mut current = value;

    loop {
        match current {
            Value::Pair(pair) => {
                items.push(pair.head.clone());
                current = &pair.rest;
            }
            other => {
                items.push(other.clone());
                break;
            }
        }
    }

    items
}

/// Encode elements as right-nested pairs with the last element bare.
pub fn list_to_pairs(items: Vec<Value>) -> Value {
    let mut items = items.into_iter().rev();
    let Some(last) = items.next() else {
        return Value::Empty;
    };
    items.fold(last, |rest, head| Value::pair(head, rest))
}

// ============================================================================
// Type Guards
// ============================================================================

pub const NUMBER: &[ValueKind] = &[ValueKind::Number];
pub const FUNCTION: &[ValueKind] = &[ValueKind::Function];
/// Also the guard for list positions: a lone value is a one-element list.
pub const ANY: &[ValueKind] = &[ValueKind::Number, ValueKind::List, ValueKind::Function];

/// Fail with a type error unless `value`'s kind is in `allowed`.
pub fn check(name: &str, allowed: &[ValueKind], value: &Value) -> Result<()> {
    let kind = value.kind();
    if allowed.contains(&kind) {
        return Ok(());
    }
    let allowed: Vec<&str> = allowed.iter().map(|k| k.name()).collect();
    Err(PuppyError::type_mismatch(name, &allowed, kind.name()))
}

/// Extract a number from a Value
pub fn extract_number(name: &str, value: &Value) -> Result<f64> {
    check(name, NUMBER, value)?;
    value
        .as_number()
        .ok_or_else(|| PuppyError::type_mismatch(name, &["number"], value.kind().name()))
}

/// Extract an integral number, for operations that count or test parity.
pub fn extract_integer(name: &str, value: &Value) -> Result<i64> {
    let n = extract_number(name, value)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(PuppyError::domain(format!("{name}: expected an integer, got {value}")));
    }
    Ok(n as i64)
}

// ============================================================================
// Primitive Constructors
// ============================================================================

pub fn primitive<F>(name: &'static str, func: F) -> Value
where
    F: Fn(Value, &mut Interpreter) -> Result<Value> + 'static,
{
    Value::function(Function::Primitive(Primitive {
        name,
        func: Rc::new(func),
    }))
}

/// A guarded one-argument primitive.
pub fn unary<F>(name: &'static str, allowed: &'static [ValueKind], func: F) -> Value
where
    F: Fn(Value, &mut Interpreter) -> Result<Value> + 'static,
{
    primitive(name, move |arg, interp| {
        check(name, allowed, &arg)?;
        func(arg, interp)
    })
}

/// A guarded, curried two-argument primitive.
pub fn binary<F>(
    name: &'static str,
    first: &'static [ValueKind],
    second: &'static [ValueKind],
    func: F,
) -> Value
where
    F: Fn(Value, Value, &mut Interpreter) -> Result<Value> + 'static,
{
    let func = Rc::new(func);
    unary(name, first, move |a, _| {
        let func = Rc::clone(&func);
        Ok(unary(name, second, move |b, interp| func(a.clone(), b, interp)))
    })
}

/// A guarded, curried three-argument primitive.
pub fn ternary<F>(
    name: &'static str,
    first: &'static [ValueKind],
    second: &'static [ValueKind],
    third: &'static [ValueKind],
    func: F,
) -> Value
where
    F: Fn(Value, Value, Value, &mut Interpreter) -> Result<Value> + 'static,
{
    let func = Rc::new(func);
    binary(name, first, second, move |a, b, _| {
        let func = Rc::clone(&func);
        Ok(unary(name, third, move |c, interp| {
            func(a.clone(), b.clone(), c, interp)
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use puppy::ErrorKind;

    fn numbers(ns: &[f64]) -> Vec<Value> {
        ns.iter().copied().map(Value::Number).collect()
    }

    #[test]
    fn test_pair_encoding_shape() {
        assert_eq!(list_to_pairs(numbers(&[5.0])), Value::number(5));
        assert_eq!(list_to_pairs(vec![]), Value::Empty);

        let encoded = list_to_pairs(numbers(&[1.0, 2.0, 3.0]));
        let expected = Value::pair(
            Value::number(1),
            Value::pair(Value::number(2), Value::number(3)),
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_round_trip() {
        let items = numbers(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(pairs_to_list(&list_to_pairs(items.clone())), items);
        assert!(pairs_to_list(&Value::Empty).is_empty());
        assert_eq!(pairs_to_list(&Value::number(9)), numbers(&[9.0]));
    }

    #[test]
    fn test_trailing_empty_list_is_an_element() {
        let items = vec![Value::number(1), Value::Empty];
        let encoded = list_to_pairs(items.clone());
        assert_eq!(encoded, Value::pair(Value::number(1), Value::Empty));
        assert_eq!(pairs_to_list(&encoded), items);
    }

    #[test]
    fn test_check() {
        assert!(check("neg", NUMBER, &Value::number(1)).is_ok());
        let err = check("neg", NUMBER, &Value::Empty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        assert!(err.message.contains("'neg'"));
        assert!(err.message.contains("'list'"));
    }

    #[test]
    fn test_extract_integer() {
        assert_eq!(extract_integer("odd?", &Value::number(4)).unwrap(), 4);
        let err = extract_integer("odd?", &Value::number(1.5)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Domain);
    }
}
