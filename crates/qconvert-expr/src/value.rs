//! Numeric values produced by expression evaluation.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A real or complex number.
///
/// Values stay real as long as every operand is real and the operation is
/// real-defined on its input. Anything touching the imaginary unit becomes
/// [`Value::Complex`], even if its imaginary part later cancels out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A real number.
    Real(f64),
    /// A complex number.
    Complex(Complex64),
}

impl Value {
    /// The imaginary unit.
    pub const I: Value = Value::Complex(Complex64::new(0.0, 1.0));

    /// Create a purely imaginary value `im * i`.
    pub fn imaginary(im: f64) -> Self {
        Value::Complex(Complex64::new(0.0, im))
    }

    /// View the value as a complex number.
    pub fn to_complex(self) -> Complex64 {
        match self {
            Value::Real(v) => Complex64::new(v, 0.0),
            Value::Complex(c) => c,
        }
    }

    /// The real value, if this is a real number.
    pub fn as_real(self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(v),
            Value::Complex(_) => None,
        }
    }

    /// Whether the value is tagged complex.
    pub fn is_complex(self) -> bool {
        matches!(self, Value::Complex(_))
    }

    /// Raise to a power, staying real where the result is real.
    pub fn pow(self, exponent: Value) -> Value {
        match (self, exponent) {
            (Value::Real(b), Value::Real(e)) if b >= 0.0 || e.fract() == 0.0 => {
                Value::Real(b.powf(e))
            }
            (b, e) => Value::Complex(b.to_complex().powc(e.to_complex())),
        }
    }

    /// Approximate equality on both components.
    pub fn approx_eq(self, other: Value, tolerance: f64) -> bool {
        let d = self.to_complex() - other.to_complex();
        d.re.abs() <= tolerance && d.im.abs() <= tolerance
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Self {
        Value::Complex(c)
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                match (self, rhs) {
                    (Value::Real(a), Value::Real(b)) => Value::Real(a $op b),
                    (a, b) => Value::Complex(a.to_complex() $op b.to_complex()),
                }
            }
        }
    };
}

binary_op!(Add, add, +);
binary_op!(Sub, sub, -);
binary_op!(Mul, mul, *);
binary_op!(Div, div, /);

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        match self {
            Value::Real(v) => Value::Real(-v),
            Value::Complex(c) => Value::Complex(-c),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(v) => write!(f, "{v}"),
            Value::Complex(c) if c.im < 0.0 => write!(f, "({}-{}j)", c.re, -c.im),
            Value::Complex(c) => write!(f, "({}+{}j)", c.re, c.im),
        }
    }
}

/// Real values serialize as bare numbers, complex values as
/// `{"type": "complex", "re": .., "im": ..}`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Real(v) => serializer.serialize_f64(*v),
            Value::Complex(c) => {
                let mut s = serializer.serialize_struct("Complex", 3)?;
                s.serialize_field("type", "complex")?;
                s.serialize_field("re", &c.re)?;
                s.serialize_field("im", &c.im)?;
                s.end()
            }
        }
    }
}
