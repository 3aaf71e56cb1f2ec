use crate::error::Error;
use crate::types::Value;
use num_complex::Complex64;

/// Both operands widened to the same rung of the numeric tower.
enum Pair {
    Int(i64, i64),
    Float(f64, f64),
    Complex(Complex64, Complex64),
}

fn promote(a: Value, b: Value) -> Pair {
    match (a, b) {
        (Value::Complex(_), _) | (_, Value::Complex(_)) => {
            Pair::Complex(a.as_complex(), b.as_complex())
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Pair::Float(a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0))
        }
        _ => Pair::Int(a.as_int().unwrap_or(0), b.as_int().unwrap_or(0)),
    }
}

pub fn add(a: Value, b: Value) -> Result<Value, Error> {
    Ok(match promote(a, b) {
        Pair::Int(x, y) => x
            .checked_add(y)
            .map_or(Value::Float(x as f64 + y as f64), Value::Int),
        Pair::Float(x, y) => Value::Float(x + y),
        Pair::Complex(x, y) => Value::Complex(x + y),
    })
}

pub fn sub(a: Value, b: Value) -> Result<Value, Error> {
    Ok(match promote(a, b) {
        Pair::Int(x, y) => x
            .checked_sub(y)
            .map_or(Value::Float(x as f64 - y as f64), Value::Int),
        Pair::Float(x, y) => Value::Float(x - y),
        Pair::Complex(x, y) => Value::Complex(x - y),
    })
}

pub fn mul(a: Value, b: Value) -> Result<Value, Error> {
    Ok(match promote(a, b) {
        Pair::Int(x, y) => x
            .checked_mul(y)
            .map_or(Value::Float(x as f64 * y as f64), Value::Int),
        Pair::Float(x, y) => Value::Float(x * y),
        Pair::Complex(x, y) => Value::Complex(x * y),
    })
}

/// True division: never integral, faults on any zero divisor (`1/0.0` included).
pub fn true_div(a: Value, b: Value) -> Result<Value, Error> {
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    Ok(match promote(a, b) {
        Pair::Int(x, y) => Value::Float(x as f64 / y as f64),
        Pair::Float(x, y) => Value::Float(x / y),
        Pair::Complex(x, y) => Value::Complex(x / y),
    })
}

pub fn floor_div(a: Value, b: Value) -> Result<Value, Error> {
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    match promote(a, b) {
        Pair::Int(x, y) => Ok(match x.checked_div(y) {
            Some(q) if x % y != 0 && ((x < 0) != (y < 0)) => Value::Int(q - 1),
            Some(q) => Value::Int(q),
            None => Value::Float((x as f64 / y as f64).floor()),
        }),
        Pair::Float(x, y) => Ok(Value::Float(float_divmod(x, y).0)),
        Pair::Complex(..) => Err(Error::type_error("can't take floor of complex number")),
    }
}

pub fn modulo(a: Value, b: Value) -> Result<Value, Error> {
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    match promote(a, b) {
        Pair::Int(x, y) => {
            let r = x.checked_rem(y).unwrap_or(0);
            Ok(Value::Int(if r != 0 && ((r < 0) != (y < 0)) { r + y } else { r }))
        }
        Pair::Float(x, y) => Ok(Value::Float(float_divmod(x, y).1)),
        Pair::Complex(..) => Err(Error::type_error("can't mod complex numbers")),
    }
}

/// Floor quotient and remainder; the remainder takes the divisor's sign.
pub(crate) fn float_divmod(x: f64, y: f64) -> (f64, f64) {
    let mut m = x % y;
    let mut d = (x - m) / y;
    if m != 0.0 {
        if (y < 0.0) != (m < 0.0) {
            m += y;
            d -= 1.0;
        }
    } else {
        m = 0.0f64.copysign(y);
    }
    let q = if d != 0.0 {
        let f = d.floor();
        if d - f > 0.5 { f + 1.0 } else { f }
    } else {
        0.0f64.copysign(x / y)
    };
    (q, m)
}

pub fn pow(a: Value, b: Value) -> Result<Value, Error> {
    match promote(a, b) {
        Pair::Int(x, y) if y >= 0 => Ok(u32::try_from(y)
            .ok()
            .and_then(|e| x.checked_pow(e))
            .map_or(Value::Float((x as f64).powf(y as f64)), Value::Int)),
        Pair::Int(x, y) => {
            if x == 0 {
                return Err(Error::division_by_zero());
            }
            Ok(Value::Float((x as f64).powf(y as f64)))
        }
        Pair::Float(x, y) => {
            if x == 0.0 && y < 0.0 {
                return Err(Error::division_by_zero());
            }
            if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
                return Ok(Value::Complex(
                    Complex64::new(x, 0.0).powc(Complex64::new(y, 0.0)),
                ));
            }
            Ok(Value::Float(x.powf(y)))
        }
        Pair::Complex(x, y) => {
            if x.re == 0.0 && x.im == 0.0 {
                if y.re == 0.0 && y.im == 0.0 {
                    return Ok(Value::Complex(Complex64::new(1.0, 0.0)));
                }
                if y.im != 0.0 || y.re < 0.0 {
                    return Err(Error::division_by_zero());
                }
                return Ok(Value::Complex(Complex64::new(0.0, 0.0)));
            }
            Ok(Value::Complex(x.powc(y)))
        }
    }
}

pub fn neg(a: Value) -> Result<Value, Error> {
    Ok(match a {
        Value::Bool(_) | Value::Int(_) => {
            let i = a.as_int().unwrap_or(0);
            i.checked_neg().map_or(Value::Float(-(i as f64)), Value::Int)
        }
        Value::Float(f) => Value::Float(-f),
        Value::Complex(c) => Value::Complex(-c),
    })
}

pub fn pos(a: Value) -> Result<Value, Error> {
    Ok(match a {
        Value::Bool(b) => Value::Int(b as i64),
        other => other,
    })
}

pub fn values_equal(a: Value, b: Value) -> bool {
    match promote(a, b) {
        Pair::Int(x, y) => x == y,
        Pair::Float(x, y) => x == y,
        Pair::Complex(x, y) => x == y,
    }
}

pub fn eq(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(values_equal(a, b)))
}

pub fn ne(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(!values_equal(a, b)))
}

fn ordering(a: Value, b: Value, op: &str) -> Result<Option<std::cmp::Ordering>, Error> {
    match promote(a, b) {
        Pair::Int(x, y) => Ok(Some(x.cmp(&y))),
        Pair::Float(x, y) => Ok(x.partial_cmp(&y)),
        Pair::Complex(..) => Err(Error::type_error(format!(
            "'{}' not supported between complex numbers",
            op
        ))),
    }
}

pub fn lt(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(ordering(a, b, "<")?.is_some_and(|o| o.is_lt())))
}

pub fn le(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(ordering(a, b, "<=")?.is_some_and(|o| o.is_le())))
}

pub fn gt(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(ordering(a, b, ">")?.is_some_and(|o| o.is_gt())))
}

pub fn ge(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::Bool(ordering(a, b, ">=")?.is_some_and(|o| o.is_ge())))
}
