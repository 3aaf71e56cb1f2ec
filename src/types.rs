use num_complex::Complex64;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// A number produced by evaluation.
///
/// The variants form a tower `Bool < Int < Float < Complex`: mixed operands
/// are widened to the higher of the two before an operator is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
        }
    }

    /// Integer view of `Bool` and `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Real view of everything below `Complex`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Complex64 {
        match self {
            Value::Complex(c) => *c,
            other => Complex64::new(other.as_f64().unwrap_or(0.0), 0.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    pub fn truthy(&self) -> bool {
        !self.is_zero()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Self {
        Value::Complex(c)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Complex(c) => {
                if c.re == 0.0 && c.re.is_sign_positive() {
                    write!(f, "{}j", format_component(c.im))
                } else {
                    let sign = if c.im.is_sign_negative() && !c.im.is_nan() { "-" } else { "+" };
                    write!(
                        f,
                        "({}{}{}j)",
                        format_component(c.re),
                        sign,
                        format_component(c.im.abs())
                    )
                }
            }
        }
    }
}

/// Floats always carry a fractional part or an exponent so they never read as ints.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return with_signed_exponent(format!("{:e}", x));
    }
    if x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

// Parts of a complex number drop the trailing `.0`.
fn format_component(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{}", x)
    }
}

// Exponents carry a sign and at least two digits: `1e+20`, `1e-05`.
fn with_signed_exponent(s: String) -> String {
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}
