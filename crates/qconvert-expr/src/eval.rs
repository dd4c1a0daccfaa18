//! Expression evaluation with a shared compile cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ast::{self, Expr};
use crate::error::{ExprError, ExprResult};
use crate::lexer::internal_name;
use crate::parser::parse;
use crate::value::Value;

/// Parameter name to value bindings for one evaluation.
///
/// Names are stored under their internal alias (see
/// [`internal_name`](crate::internal_name)); callers always use the domain
/// name on both insert and lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: FxHashMap<String, Value>,
}

impl Bindings {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values
            .insert(internal_name(name).to_string(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a parameter by its domain name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(internal_name(name)).copied()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn resolve(&self, internal: &str) -> Option<Value> {
        self.values.get(internal).copied()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that compiled the expression.
    pub misses: u64,
    /// Distinct expressions currently cached.
    pub entries: usize,
}

/// Compiles and evaluates expressions.
///
/// Compiled expressions are cached by source text for the lifetime of the
/// evaluator. The cache is a read-through cache behind an `RwLock`, so one
/// evaluator can be shared between threads.
#[derive(Debug, Default)]
pub struct Evaluator {
    cache: RwLock<FxHashMap<String, Arc<Expr>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Evaluator {
    /// Create an evaluator with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile an expression, consulting the cache first.
    pub fn compile(&self, source: &str) -> ExprResult<Arc<Expr>> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(expr) = cache.get(source) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(expression = source, "expression cache hit");
                return Ok(Arc::clone(expr));
            }
        }

        let compiled = Arc::new(parse(source)?);
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(expression = source, "expression cache miss");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have compiled the same text in the meantime.
        let entry = cache
            .entry(source.to_string())
            .or_insert_with(|| Arc::clone(&compiled));
        Ok(Arc::clone(entry))
    }

    /// Compile (or fetch) and evaluate an expression.
    pub fn evaluate(&self, source: &str, bindings: &Bindings) -> ExprResult<Value> {
        let expr = self.compile(source)?;
        eval_expr(&expr, bindings, source)
    }

    /// Evaluate a closed-form expression that takes no parameters.
    pub fn evaluate_constant(&self, source: &str) -> ExprResult<Value> {
        self.evaluate(source, &Bindings::new())
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}

/// Evaluate a compiled expression against bindings.
///
/// `source` is only used to name the expression in errors.
pub fn eval_expr(expr: &Expr, bindings: &Bindings, source: &str) -> ExprResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(*v),
        Expr::Identifier(name) => bindings
            .resolve(name)
            .or_else(|| ast::constant(name))
            .ok_or_else(|| ExprError::UnknownIdentifier {
                expression: source.to_string(),
                name: name.clone(),
            }),
        Expr::Neg(inner) => Ok(-eval_expr(inner, bindings, source)?),
        Expr::BinaryOp { op, left, right } => {
            let l = eval_expr(left, bindings, source)?;
            let r = eval_expr(right, bindings, source)?;
            Ok(op.apply(l, r))
        }
        Expr::Call { function, args } => {
            // Arity is checked at parse time; every built-in is unary.
            let arg = match args.as_slice() {
                [arg] => eval_expr(arg, bindings, source)?,
                _ => {
                    return Err(ExprError::WrongArgumentCount {
                        expression: source.to_string(),
                        name: format!("{function:?}").to_lowercase(),
                        expected: function.arity(),
                        got: args.len(),
                    });
                }
            };
            Ok(function.apply(arg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_real_expression() {
        let ev = Evaluator::new();
        let b = Bindings::new().with("theta", PI);
        let v = ev.evaluate("cos(theta / 2)", &b).unwrap();
        assert!(v.approx_eq(Value::Real(0.0), EPS));
        assert!(!v.is_complex());
    }

    #[test]
    fn test_complex_expression_with_lambda() {
        let ev = Evaluator::new();
        let b = Bindings::new().with("lambda", PI / 2.0);
        let v = ev.evaluate("exp(i * lambda)", &b).unwrap();
        assert!(v.is_complex());
        assert!(v.approx_eq(Value::Complex(Complex64::new(0.0, 1.0)), EPS));
    }

    #[test]
    fn test_lambda_lookup_uses_domain_name() {
        let b = Bindings::new().with("lambda", 1.5);
        assert_eq!(b.get("lambda"), Some(Value::Real(1.5)));
    }

    #[test]
    fn test_coefficient_imaginary() {
        let ev = Evaluator::new();
        let v = ev.evaluate_constant("1 + 2i").unwrap();
        assert_eq!(v, Value::Complex(Complex64::new(1.0, 2.0)));
    }

    #[test]
    fn test_constants() {
        let ev = Evaluator::new();
        let v = ev.evaluate_constant("-pi/2").unwrap();
        assert!(v.approx_eq(Value::Real(-PI / 2.0), EPS));
        let v = ev.evaluate_constant("1 / sqrt(2)").unwrap();
        assert!(v.approx_eq(Value::Real(std::f64::consts::FRAC_1_SQRT_2), EPS));
    }

    #[test]
    fn test_parameter_shadows_constant() {
        let ev = Evaluator::new();
        let b = Bindings::new().with("e", 2.0);
        assert_eq!(ev.evaluate("e * 2", &b).unwrap(), Value::Real(4.0));
    }

    #[test]
    fn test_unknown_identifier() {
        let ev = Evaluator::new();
        let err = ev.evaluate("cos(phi)", &Bindings::new()).unwrap_err();
        assert_eq!(
            err,
            ExprError::UnknownIdentifier {
                expression: "cos(phi)".into(),
                name: "phi".into(),
            }
        );
    }

    #[test]
    fn test_cache_is_consulted_on_second_compile() {
        let ev = Evaluator::new();
        let a = ev
            .evaluate("sin(theta)", &Bindings::new().with("theta", 0.0))
            .unwrap();
        let b = ev
            .evaluate("sin(theta)", &Bindings::new().with("theta", PI / 2.0))
            .unwrap();
        assert!(a.approx_eq(Value::Real(0.0), EPS));
        assert!(b.approx_eq(Value::Real(1.0), EPS));

        let stats = ev.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_parse_errors_are_not_cached() {
        let ev = Evaluator::new();
        assert!(ev.evaluate_constant("1 +").is_err());
        assert!(ev.evaluate_constant("1 +").is_err());
        assert_eq!(ev.stats().entries, 0);
    }

    #[test]
    fn test_shared_between_threads() {
        let ev = Arc::new(Evaluator::new());
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let ev = Arc::clone(&ev);
                std::thread::spawn(move || {
                    ev.evaluate("x * 2", &Bindings::new().with("x", f64::from(k)))
                        .unwrap()
                })
            })
            .collect();
        for (k, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Value::Real(2.0 * k as f64));
        }
        assert_eq!(ev.stats().entries, 1);
    }
}
