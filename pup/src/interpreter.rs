use std::rc::Rc;

use puppy::{Ast, PuppyError, Result, ensure_sufficient_stack};
use tracing::{debug, trace};

use crate::environment::Environment;
use crate::native::list_to_pairs;
use crate::value::{Closure, Function, Value};

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluation context for one top-level expression.
///
/// Tracks how deeply `evaluate` has recursed so runaway programs fail with a
/// resource error instead of exhausting the native stack.
pub struct Interpreter {
    depth: usize,
    max_depth: usize,
}

/// Reduce a syntax tree to a value.
pub trait Evaluate {
    fn evaluate(&self, env: &Environment, interp: &mut Interpreter) -> Result<Value>;
}

impl Evaluate for Ast {
    fn evaluate(&self, env: &Environment, interp: &mut Interpreter) -> Result<Value> {
        interp.evaluate(self, env)
    }
}

impl Interpreter {
    pub fn new(max_depth: usize) -> Self {
        Interpreter {
            depth: 0,
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn evaluate(&mut self, ast: &Ast, env: &Environment) -> Result<Value> {
        self.nested(|interp| interp.evaluate_node(ast, env))
    }

    /// Run `f` one level deeper, failing once the depth limit is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            debug!(max_depth = self.max_depth, "evaluation depth limit reached");
            return Err(PuppyError::recursion_limit(self.max_depth));
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }

    fn evaluate_node(&mut self, ast: &Ast, env: &Environment) -> Result<Value> {
        match ast {
            Ast::Number(n) => Ok(Value::Number(*n)),

            Ast::Symbol(name) => env.lookup(*name),

            Ast::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.evaluate(then_branch, env)
                } else {
                    self.evaluate(else_branch, env)
                }
            }

            Ast::Define { name, value } => {
                if env.resolves(*name) {
                    return Err(PuppyError::redefinition(name));
                }
                let value = self.evaluate(value, env)?;
                env.define(*name, value.clone())?;
                debug!(%name, %value, "define");
                Ok(value)
            }

            Ast::ListItems(items) => self.evaluate_items(items, env),

            Ast::Malformed(source) => Err(PuppyError::syntax(format!(
                "Malformed expression: {source}"
            ))),

            Ast::Apply { function, argument } => self.evaluate_apply(function, argument, env),
        }
    }

    fn evaluate_items(&mut self, items: &[Rc<Ast>], env: &Environment) -> Result<Value> {
        let values = items
            .iter()
            .map(|item| self.evaluate(item, env))
            .collect::<Result<Vec<_>>>()?;
        Ok(list_to_pairs(values))
    }

    fn evaluate_apply(
        &mut self,
        function: &Ast,
        argument: &Rc<Ast>,
        env: &Environment,
    ) -> Result<Value> {
        let callee = self.evaluate(function, env)?;
        let Value::Function(func) = &callee else {
            return Err(PuppyError::not_callable(&callee));
        };

        match func.as_ref() {
            // `[a b c]`: evaluate each literal element, not a decoded list.
            Function::ListLiteral => match argument.as_ref() {
                Ast::ListItems(items) => self.evaluate_items(items, env),
                other => {
                    let value = self.evaluate(other, env)?;
                    self.apply(&callee, value)
                }
            },

            // `(lambda x)`: the parameter name is never evaluated.
            Function::Lambda => match argument.as_ref() {
                Ast::Symbol(param) => Ok(Value::function(Function::LambdaParam {
                    param: *param,
                    env: env.clone(),
                })),
                other => Err(PuppyError::syntax(format!(
                    "lambda expects a parameter name, got {other}"
                ))),
            },

            // `((lambda x) body)`: the body stays unevaluated until applied.
            Function::LambdaParam { param, env: defining } => {
                Ok(Value::function(Function::Closure(Closure {
                    param: *param,
                    body: Rc::clone(argument),
                    env: defining.clone(),
                })))
            }

            Function::Primitive(_) | Function::Closure(_) | Function::Composed { .. } => {
                let value = self.evaluate(argument, env)?;
                self.apply(&callee, value)
            }
        }
    }

    /// Apply a function value to an already evaluated argument.
    ///
    /// Counts against the depth limit like `evaluate`, since primitives such
    /// as `map` and composed functions apply other functions natively.
    pub fn apply(&mut self, function: &Value, argument: Value) -> Result<Value> {
        self.nested(|interp| interp.apply_function(function, argument))
    }

    fn apply_function(&mut self, function: &Value, argument: Value) -> Result<Value> {
        let Value::Function(func) = function else {
            return Err(PuppyError::not_callable(function));
        };

        match func.as_ref() {
            Function::Primitive(primitive) => {
                trace!(name = primitive.name, %argument, "apply primitive");
                (primitive.func)(argument, self)
            }
            Function::Closure(closure) => {
                trace!(param = %closure.param, %argument, depth = self.depth, "apply closure");
                let scope = closure.env.extend(closure.param, argument);
                self.evaluate(&closure.body, &scope)
            }
            Function::Composed { outer, inner } => {
                let intermediate = self.apply(inner, argument)?;
                self.apply(outer, intermediate)
            }
            Function::ListLiteral => Ok(argument),
            Function::Lambda => Err(PuppyError::new(
                puppy::ErrorKind::Type,
                "lambda must be applied to a literal parameter name",
            )),
            Function::LambdaParam { param, .. } => Err(PuppyError::new(
                puppy::ErrorKind::Type,
                format!("lambda {param} must be applied to a literal body"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::register_stdlib;
    use puppy::{ErrorKind, build_program};

    fn eval_in(env: &Environment, input: &str) -> Result<Value> {
        let mut last = Value::Empty;
        for tree in build_program(input)? {
            last = tree.evaluate(env, &mut Interpreter::new(1_000))?;
        }
        Ok(last)
    }

    fn stdlib_env() -> Environment {
        let env = Environment::new();
        register_stdlib(&env);
        env
    }

    #[test]
    fn test_number_needs_no_environment() {
        let env = Environment::new();
        assert_eq!(eval_in(&env, "3").unwrap(), Value::number(3));
    }

    #[test]
    fn test_curried_addition() {
        assert_eq!(eval_in(&stdlib_env(), "(+ 1 2)").unwrap(), Value::number(3));
    }

    #[test]
    fn test_lambda_stages() {
        let env = stdlib_env();
        let stage1 = eval_in(&env, "(lambda x)").unwrap();
        assert_eq!(stage1.to_string(), "<lambda x>");
        let closure = eval_in(&env, "(x -> (* x x))").unwrap();
        assert_eq!(closure.to_string(), "<closure x>");
        assert_eq!(eval_in(&env, "((x -> (* x x)) 7)").unwrap(), Value::number(49));
    }

    #[test]
    fn test_lambda_requires_symbol() {
        let err = eval_in(&stdlib_env(), "(lambda 3)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_applying_a_number_fails() {
        let err = eval_in(&stdlib_env(), "(1 2)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_if_short_circuits() {
        let env = stdlib_env();
        assert_eq!(
            eval_in(&env, "(if (> 1 0) 10 (undefined-symbol))").unwrap(),
            Value::number(10)
        );
        eval_in(&env, "(if 0 (define never 1) 2)").unwrap();
        assert!(!env.resolves(puppy::Symbol::new("never")));
    }

    #[test]
    fn test_depth_limit() {
        let env = stdlib_env();
        let mut source = String::from("1");
        for _ in 0..100 {
            source = format!("(+ 1 {source})");
        }
        let tree = build_program(&source).unwrap().remove(0);

        let err = tree.evaluate(&env, &mut Interpreter::new(50)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionLimit);

        let mut interp = Interpreter::new(1_000);
        assert_eq!(tree.evaluate(&env, &mut interp).unwrap(), Value::number(101));
        assert_eq!(interp.depth(), 0);
    }
}
