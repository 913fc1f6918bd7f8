//! Standard library native functions
//!
//! Every primitive takes one argument; an n-ary primitive returns a chain of
//! n single-argument functions. Each position is guarded by an allow-list of
//! runtime kinds, checked when the argument arrives.

use std::rc::Rc;

use puppy::{PuppyError, Result, Symbol};

use crate::environment::Environment;
use crate::native::{
    ANY, FUNCTION, NUMBER, binary, check, extract_integer, extract_number,
    list_to_pairs, pairs_to_list, primitive, ternary, unary,
};
use crate::value::{Function, Value};

const PI: f64 = 3.1415926535;

// ============================================================================
// Arithmetic
// ============================================================================

fn arithmetic(name: &'static str, op: fn(f64, f64) -> f64) -> Value {
    binary(name, NUMBER, NUMBER, move |a, b, _| {
        Ok(Value::Number(op(
            extract_number(name, &a)?,
            extract_number(name, &b)?,
        )))
    })
}

fn divide() -> Value {
    binary("/", NUMBER, NUMBER, |a, b, _| {
        let divisor = extract_number("/", &b)?;
        if divisor == 0.0 {
            return Err(PuppyError::division_by_zero("/"));
        }
        Ok(Value::Number(extract_number("/", &a)? / divisor))
    })
}

fn sqrt() -> Value {
    unary("sqrt", NUMBER, |x, _| {
        let n = extract_number("sqrt", &x)?;
        if n < 0.0 {
            return Err(PuppyError::domain(format!("sqrt: negative argument {x}")));
        }
        Ok(Value::Number(n.sqrt()))
    })
}

fn negate() -> Value {
    unary("neg", NUMBER, |x, _| Ok(Value::Number(-extract_number("neg", &x)?)))
}

// ============================================================================
// Predicates and Logic
// ============================================================================

fn comparison(name: &'static str, op: fn(f64, f64) -> bool) -> Value {
    binary(name, NUMBER, NUMBER, move |a, b, _| {
        Ok(Value::boolean(op(
            extract_number(name, &a)?,
            extract_number(name, &b)?,
        )))
    })
}

fn parity(name: &'static str, odd: bool) -> Value {
    unary(name, NUMBER, move |x, _| {
        let n = extract_integer(name, &x)?;
        Ok(Value::boolean((n % 2 != 0) == odd))
    })
}

fn equal(name: &'static str) -> Value {
    binary(name, ANY, ANY, |a, b, _| Ok(Value::boolean(a == b)))
}

fn logic(name: &'static str, op: fn(bool, bool) -> bool) -> Value {
    binary(name, ANY, ANY, move |a, b, _| {
        Ok(Value::boolean(op(a.is_truthy(), b.is_truthy())))
    })
}

fn not() -> Value {
    unary("not", ANY, |x, _| Ok(Value::boolean(!x.is_truthy())))
}

fn assert() -> Value {
    unary("assert", ANY, |x, _| {
        if x.is_truthy() {
            Ok(Value::boolean(true))
        } else {
            Err(PuppyError::assertion())
        }
    })
}

// ============================================================================
// Lists
// ============================================================================

fn head() -> Value {
    unary("head", ANY, |list, _| match list {
        Value::Empty => Err(PuppyError::empty_list("head")),
        Value::Pair(pair) => Ok(pair.head.clone()),
        single => Ok(single),
    })
}

fn tail() -> Value {
    unary("tail", ANY, |list, _| match list {
        Value::Empty => Err(PuppyError::empty_list("tail")),
        Value::Pair(pair) => Ok(pair.rest.clone()),
        _ => Ok(Value::Empty),
    })
}

fn init() -> Value {
    unary("init", ANY, |list, _| {
        let mut items = pairs_to_list(&list);
        if items.pop().is_none() {
            return Err(PuppyError::empty_list("init"));
        }
        Ok(list_to_pairs(items))
    })
}

fn last() -> Value {
    unary("last", ANY, |list, _| {
        pairs_to_list(&list)
            .pop()
            .ok_or_else(|| PuppyError::empty_list("last"))
    })
}

fn length() -> Value {
    unary("length", ANY, |list, _| {
        Ok(Value::Number(pairs_to_list(&list).len() as f64))
    })
}

fn is_null() -> Value {
    unary("null?", ANY, |list, _| {
        Ok(Value::boolean(matches!(list, Value::Empty)))
    })
}

fn concat() -> Value {
    binary("concat", ANY, ANY, |a, b, _| {
        let mut items = pairs_to_list(&a);
        items.extend(pairs_to_list(&b));
        Ok(list_to_pairs(items))
    })
}

fn map() -> Value {
    binary("map", FUNCTION, ANY, |f, list, interp| {
        let items = pairs_to_list(&list)
            .into_iter()
            .map(|item| interp.apply(&f, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(list_to_pairs(items))
    })
}

fn filter() -> Value {
    binary("filter", FUNCTION, ANY, |f, list, interp| {
        let mut kept = Vec::new();
        for item in pairs_to_list(&list) {
            if interp.apply(&f, item.clone())?.is_truthy() {
                kept.push(item);
            }
        }
        Ok(list_to_pairs(kept))
    })
}

/// Right fold without a seed: `fold f [a b c]` is `f a (f b c)`.
fn fold() -> Value {
    binary("fold", FUNCTION, ANY, |f, list, interp| {
        let mut items = pairs_to_list(&list).into_iter().rev();
        let mut acc = items.next().ok_or_else(|| PuppyError::empty_list("fold"))?;
        for item in items {
            let partial = interp.apply(&f, item)?;
            acc = interp.apply(&partial, acc)?;
        }
        Ok(acc)
    })
}

fn numbers_between(start: f64, end: f64) -> Value {
    let (start, end) = (start.trunc() as i64, end.trunc() as i64);
    list_to_pairs((start..end).map(|n| Value::Number(n as f64)).collect())
}

fn range() -> Value {
    binary("range", NUMBER, NUMBER, |a, b, _| {
        Ok(numbers_between(
            extract_number("range", &a)?,
            extract_number("range", &b)?,
        ))
    })
}

fn to() -> Value {
    unary("to", NUMBER, |n, _| {
        Ok(numbers_between(0.0, extract_number("to", &n)?))
    })
}

fn repeat() -> Value {
    binary("repeat", NUMBER, ANY, |n, x, _| {
        let count = extract_integer("repeat", &n)?.max(0) as usize;
        Ok(list_to_pairs(vec![x; count]))
    })
}

/// Two-element pair constructor: `(list a b)` is `[a b]` when `b` is not
/// itself a list.
fn pair() -> Value {
    binary("list", ANY, ANY, |a, b, _| Ok(Value::pair(a, b)))
}

// ============================================================================
// Combinators
// ============================================================================

fn compose() -> Value {
    binary("compose", FUNCTION, FUNCTION, |outer, inner, _| {
        Ok(Value::function(Function::Composed { outer, inner }))
    })
}

fn compose_list() -> Value {
    unary("compose-list", ANY, |list, _| {
        let functions = pairs_to_list(&list);
        if functions.is_empty() {
            return Err(PuppyError::empty_list("compose-list"));
        }
        for function in &functions {
            check("compose-list", FUNCTION, function)?;
        }
        let functions = Rc::new(functions);
        Ok(primitive("compose-list", move |x, interp| {
            functions
                .iter()
                .rev()
                .try_fold(x, |acc, function| interp.apply(function, acc))
        }))
    })
}

fn flip() -> Value {
    ternary("flip", FUNCTION, ANY, ANY, |f, x, y, interp| {
        let partial = interp.apply(&f, y)?;
        interp.apply(&partial, x)
    })
}

fn uncurry() -> Value {
    binary("uncurry", FUNCTION, ANY, |f, list, interp| match list {
        Value::Pair(pair) => {
            let partial = interp.apply(&f, pair.head.clone())?;
            interp.apply(&partial, pair.rest.clone())
        }
        other => Err(PuppyError::domain(format!(
            "uncurry: expected a list of at least two elements, got {other}"
        ))),
    })
}

fn first() -> Value {
    binary("fst", ANY, ANY, |a, _, _| Ok(a))
}

fn second() -> Value {
    binary("snd", ANY, ANY, |_, b, _| Ok(b))
}

// ============================================================================
// Registration
// ============================================================================

/// The standard library as `(name, value)` bindings.
pub fn exports() -> Vec<(&'static str, Value)> {
    let lambda = Value::function(Function::Lambda);

    vec![
        // Arithmetic
        ("+", arithmetic("+", |a, b| a + b)),
        ("-", arithmetic("-", |a, b| a - b)),
        ("*", arithmetic("*", |a, b| a * b)),
        ("/", divide()),
        ("sqrt", sqrt()),
        ("neg", negate()),
        ("pi", Value::Number(PI)),
        // Predicates
        (">", comparison(">", |a, b| a > b)),
        ("<", comparison("<", |a, b| a < b)),
        ("eq?", equal("eq?")),
        ("=", equal("=")),
        ("odd?", parity("odd?", true)),
        ("even?", parity("even?", false)),
        ("odd", parity("odd", true)),
        ("even", parity("even", false)),
        ("and", logic("and", |a, b| a && b)),
        ("or", logic("or", |a, b| a || b)),
        ("not", not()),
        ("assert", assert()),
        // Lists
        ("head", head()),
        ("tail", tail()),
        ("init", init()),
        ("last", last()),
        ("length", length()),
        ("null?", is_null()),
        ("concat", concat()),
        ("map", map()),
        ("filter", filter()),
        ("fold", fold()),
        ("range", range()),
        ("to", to()),
        ("repeat", repeat()),
        ("list", pair()),
        // Combinators
        ("compose", compose()),
        ("compose-list", compose_list()),
        ("flip", flip()),
        ("uncurry", uncurry()),
        ("fst", first()),
        ("snd", second()),
        // Special callables
        ("lambda", lambda.clone()),
        ("\\", lambda),
        (puppy::parser::LIST_LITERAL, Value::function(Function::ListLiteral)),
    ]
}

/// Bind the standard library into `env`.
pub fn register_stdlib(env: &Environment) {
    for (name, value) in exports() {
        env.define_local(Symbol::new(name), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    #[test]
    fn test_register_binds_every_export() {
        let env = Environment::new();
        register_stdlib(&env);
        assert_eq!(env.len(), exports().len());
        assert!(env.resolves(Symbol::new("compose-list")));
        assert!(env.resolves(Symbol::new("__list")));
    }

    #[test]
    fn test_lambda_alias_is_the_same_callable() {
        let env = Environment::new();
        register_stdlib(&env);
        let lambda = env.lookup(Symbol::new("lambda")).unwrap();
        let alias = env.lookup(Symbol::new("\\")).unwrap();
        assert_eq!(lambda, alias);
    }

    #[test]
    fn test_partial_application_keeps_name() {
        let mut interp = Interpreter::new(100);
        let plus = arithmetic("+", |a, b| a + b);
        let plus_one = interp.apply(&plus, Value::number(1)).unwrap();
        assert_eq!(plus_one.to_string(), "<function +>");
        assert_eq!(interp.apply(&plus_one, Value::number(2)).unwrap(), Value::number(3));
    }
}
