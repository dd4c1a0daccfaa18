//! Syntax tree for compiled expressions.

use num_complex::Complex64;

use crate::value::Value;

/// A compiled arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal (real, or imaginary for `2i` / `i`).
    Literal(Value),
    /// Parameter or environment constant.
    Identifier(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// Binary operation.
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Call of a built-in function.
    Call { function: Function, args: Vec<Expr> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    /// Apply the operator.
    pub fn apply(self, left: Value, right: Value) -> Value {
        match self {
            BinOp::Add => left + right,
            BinOp::Sub => left - right,
            BinOp::Mul => left * right,
            BinOp::Div => left / right,
            BinOp::Pow => left.pow(right),
        }
    }
}

/// Built-in math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
    Abs,
}

impl Function {
    /// Look up a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "log" => Function::Log,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            _ => return None,
        };
        Some(function)
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        1
    }

    /// Apply the function to a single argument.
    ///
    /// Real arguments produce real results wherever the function is
    /// real-valued on that argument; otherwise the complex branch is used.
    pub fn apply(self, arg: Value) -> Value {
        match arg {
            Value::Real(x) => match self {
                Function::Sin => Value::Real(x.sin()),
                Function::Cos => Value::Real(x.cos()),
                Function::Tan => Value::Real(x.tan()),
                Function::Atan => Value::Real(x.atan()),
                Function::Sinh => Value::Real(x.sinh()),
                Function::Cosh => Value::Real(x.cosh()),
                Function::Tanh => Value::Real(x.tanh()),
                Function::Exp => Value::Real(x.exp()),
                Function::Abs => Value::Real(x.abs()),
                Function::Asin if (-1.0..=1.0).contains(&x) => Value::Real(x.asin()),
                Function::Acos if (-1.0..=1.0).contains(&x) => Value::Real(x.acos()),
                Function::Log if x >= 0.0 => Value::Real(x.ln()),
                Function::Sqrt if x >= 0.0 => Value::Real(x.sqrt()),
                _ => self.apply_complex(Complex64::new(x, 0.0)),
            },
            Value::Complex(c) => self.apply_complex(c),
        }
    }

    fn apply_complex(self, c: Complex64) -> Value {
        let result = match self {
            Function::Sin => c.sin(),
            Function::Cos => c.cos(),
            Function::Tan => c.tan(),
            Function::Asin => c.asin(),
            Function::Acos => c.acos(),
            Function::Atan => c.atan(),
            Function::Sinh => c.sinh(),
            Function::Cosh => c.cosh(),
            Function::Tanh => c.tanh(),
            Function::Exp => c.exp(),
            Function::Log => c.ln(),
            Function::Sqrt => c.sqrt(),
            Function::Abs => return Value::Real(c.norm()),
        };
        Value::Complex(result)
    }
}

/// Constants of the built-in environment.
pub fn constant(name: &str) -> Option<Value> {
    match name {
        "pi" | "PI" => Some(Value::Real(std::f64::consts::PI)),
        "e" | "E" => Some(Value::Real(std::f64::consts::E)),
        "tau" => Some(Value::Real(std::f64::consts::TAU)),
        "i" | "j" => Some(Value::I),
        _ => None,
    }
}
