//! Expression Evaluator for qconvert
//!
//! Gate definitions describe their unitaries with symbolic cells such as
//! `"exp(i * lambda) * sin(theta / 2)"`. This crate compiles those strings
//! into a small syntax tree and evaluates them over real and complex numbers
//! for a given set of parameter bindings. No host-language `eval` is
//! involved: the grammar is plain infix arithmetic plus a fixed set of math
//! functions and constants.
//!
//! # Language
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Numbers | `1`, `0.5`, `.5`, `1e-3` |
//! | Imaginary unit | `i`, `j`, `2i` (coefficient form) |
//! | Operators | `+ - * / ^`, unary `-` |
//! | Constants | `pi`, `e`, `tau` |
//! | Functions | `sin cos tan asin acos atan sinh cosh tanh exp log sqrt abs` |
//!
//! The parameter name `lambda` is aliased internally; callers always pass
//! and look up the domain name.
//!
//! # Example
//!
//! ```rust
//! use qconvert_expr::{Bindings, Evaluator, Value};
//! use std::f64::consts::PI;
//!
//! let evaluator = Evaluator::new();
//! let params = Bindings::new().with("lambda", PI);
//! let v = evaluator.evaluate("exp(i * lambda)", &params).unwrap();
//! assert!(v.approx_eq(Value::Real(-1.0), 1e-12));
//! assert!(v.is_complex());
//! ```

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod value;

pub use ast::{BinOp, Expr, Function};
pub use error::{ExprError, ExprResult};
pub use eval::{Bindings, CacheStats, Evaluator, eval_expr};
pub use lexer::internal_name;
pub use parser::parse;
pub use value::Value;
