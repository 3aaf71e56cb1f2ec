use crate::custom::{int_arg, real_arg, NativeFunction};
use crate::error::Error;
use crate::registry::{Namespace, BUILTINS};
use crate::runtime::arithmetic;
use crate::runtime::math::float_to_int;
use crate::types::Value;
use num_complex::Complex64;

/// General-purpose functions, always active after `math`.
pub fn namespace() -> Namespace {
    Namespace::new(BUILTINS)
        .with_constant("True", Value::Bool(true))
        .with_constant("False", Value::Bool(false))
        .with_function(NativeFunction::new("abs", 1, Some(1), abs))
        .with_function(NativeFunction::new("max", 1, None, |a| extreme("max", a, arithmetic::gt)))
        .with_function(NativeFunction::new("min", 1, None, |a| extreme("min", a, arithmetic::lt)))
        .with_function(NativeFunction::new("pow", 2, Some(3), pow))
        .with_function(NativeFunction::new("round", 1, Some(2), round))
        .with_function(NativeFunction::new("sum", 0, None, sum))
        .with_function(NativeFunction::new("int", 0, Some(1), int))
        .with_function(NativeFunction::new("float", 0, Some(1), float))
        .with_function(NativeFunction::new("complex", 0, Some(2), complex))
        .with_function(NativeFunction::new("bool", 0, Some(1), |a| {
            Ok(Value::Bool(a.first().is_some_and(Value::truthy)))
        }))
}

fn abs(args: &[Value]) -> Result<Value, Error> {
    Ok(match args[0] {
        Value::Bool(_) | Value::Int(_) => {
            let i = args[0].as_int().unwrap_or(0);
            i.checked_abs().map_or(Value::Float((i as f64).abs()), Value::Int)
        }
        Value::Float(f) => Value::Float(f.abs()),
        Value::Complex(c) => Value::Float(c.norm()),
    })
}

/// First argument that wins `better` against every earlier winner.
fn extreme(
    name: &str,
    args: &[Value],
    better: fn(Value, Value) -> Result<Value, Error>,
) -> Result<Value, Error> {
    let mut best = args[0];
    for v in &args[1..] {
        if better(*v, best).map_err(|_| Error::type_error(format!("{}() expects real numbers", name)))?
            .truthy()
        {
            best = *v;
        }
    }
    if matches!(best, Value::Complex(_)) {
        return Err(Error::type_error(format!("{}() expects real numbers", name)));
    }
    Ok(best)
}

fn pow(args: &[Value]) -> Result<Value, Error> {
    if args.len() == 2 {
        return arithmetic::pow(args[0], args[1]);
    }
    let base = int_arg("pow", args, 0)?;
    let exp = int_arg("pow", args, 1)?;
    let modulus = int_arg("pow", args, 2)?;
    if modulus == 0 {
        return Err(Error::Arithmetic("pow() 3rd argument cannot be 0".to_string()));
    }
    if exp < 0 {
        return Err(Error::type_error(
            "pow() 2nd argument cannot be negative when 3rd argument specified",
        ));
    }
    let m = modulus as i128;
    let mut result: i128 = 1;
    let mut b = (base as i128).rem_euclid(m);
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m);
        }
        b = (b * b).rem_euclid(m);
        e >>= 1;
    }
    // result takes the sign of the modulus
    if result != 0 && m < 0 {
        result += m;
    }
    Ok(Value::Int(result as i64))
}

fn round(args: &[Value]) -> Result<Value, Error> {
    let digits = if args.len() > 1 { Some(int_arg("round", args, 1)?) } else { None };
    match (args[0], digits) {
        (Value::Complex(_), _) => Err(Error::type_error("round() expects a real number")),
        (Value::Bool(_) | Value::Int(_), None) => Ok(Value::Int(args[0].as_int().unwrap_or(0))),
        (Value::Bool(_) | Value::Int(_), Some(n)) if n >= 0 => {
            Ok(Value::Int(args[0].as_int().unwrap_or(0)))
        }
        (Value::Bool(_) | Value::Int(_), Some(n)) => {
            let factor = 10f64.powi(-(n.max(-308)) as i32);
            let x = args[0].as_f64().unwrap_or(0.0);
            float_to_int((x / factor).round_ties_even() * factor)
        }
        (Value::Float(x), None) => float_to_int(x.round_ties_even()),
        (Value::Float(x), Some(n)) => {
            if !x.is_finite() {
                return Ok(Value::Float(x));
            }
            let n = n.clamp(-308, 308) as i32;
            let factor = 10f64.powi(n);
            let scaled = x * factor;
            if !scaled.is_finite() {
                return Ok(Value::Float(x));
            }
            Ok(Value::Float(scaled.round_ties_even() / factor))
        }
    }
}

fn sum(args: &[Value]) -> Result<Value, Error> {
    args.iter().try_fold(Value::Int(0), |acc, v| arithmetic::add(acc, *v))
}

fn int(args: &[Value]) -> Result<Value, Error> {
    match args.first() {
        None => Ok(Value::Int(0)),
        Some(Value::Complex(_)) => Err(Error::type_error("can't convert complex to int")),
        Some(Value::Float(f)) => float_to_int(f.trunc()),
        Some(v) => Ok(Value::Int(v.as_int().unwrap_or(0))),
    }
}

fn float(args: &[Value]) -> Result<Value, Error> {
    if args.is_empty() {
        return Ok(Value::Float(0.0));
    }
    real_arg("float", args, 0).map(Value::Float)
}

fn complex(args: &[Value]) -> Result<Value, Error> {
    let re = args.first().map_or(Complex64::new(0.0, 0.0), Value::as_complex);
    let im = args.get(1).map_or(Complex64::new(0.0, 0.0), Value::as_complex);
    Ok(Value::Complex(re + im * Complex64::i()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, Error> {
        Registry::standard().resolver::<&str>(&[])?.call(name, args)
    }

    #[test]
    fn zero_argument_constructors() {
        assert_eq!(call("int", vec![]).unwrap(), Value::Int(0));
        assert_eq!(call("float", vec![]).unwrap(), Value::Float(0.0));
        assert_eq!(call("complex", vec![]).unwrap(), Value::Complex(Complex64::new(0.0, 0.0)));
        assert_eq!(call("bool", vec![]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn min_max_keep_first_extreme() {
        let args = vec![Value::Int(1), Value::Float(3.0), Value::Int(3)];
        assert_eq!(call("max", args.clone()).unwrap(), Value::Float(3.0));
        assert_eq!(call("min", args).unwrap(), Value::Int(1));
        assert!(call("max", vec![]).is_err());
        assert!(call("max", vec![Value::Int(1), Value::Complex(Complex64::new(0.0, 1.0))]).is_err());
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(call("round", vec![Value::Float(2.5)]).unwrap(), Value::Int(2));
        assert_eq!(call("round", vec![Value::Float(3.5)]).unwrap(), Value::Int(4));
        assert_eq!(call("round", vec![Value::Float(3.14159), Value::Int(2)]).unwrap(), Value::Float(3.14));
        assert_eq!(call("round", vec![Value::Int(1250), Value::Int(-2)]).unwrap(), Value::Int(1200));
    }

    #[test]
    fn integer_bounds_never_overflow() {
        let (min, max) = (Value::Int(i64::MIN), Value::Int(i64::MAX));
        assert_eq!(call("round", vec![Value::Int(5), min]).unwrap(), Value::Int(0));
        assert_eq!(call("round", vec![Value::Int(5), max]).unwrap(), Value::Int(5));
        assert_eq!(call("round", vec![Value::Float(2.5), min]).unwrap(), Value::Float(0.0));
        assert_eq!(call("round", vec![min]).unwrap(), min);
        assert_eq!(call("abs", vec![min]).unwrap(), Value::Float(9223372036854775808.0));
        assert_eq!(call("abs", vec![max]).unwrap(), max);
        assert_eq!(call("pow", vec![min, max, max]).unwrap(), Value::Int(i64::MAX - 1));
        assert_eq!(call("pow", vec![max, Value::Int(2), min]).unwrap(), Value::Int(-9223372036854775807));
        assert_eq!(call("pow", vec![Value::Int(3), max, Value::Int(1)]).unwrap(), Value::Int(0));
    }

    #[test]
    fn modular_pow() {
        assert_eq!(call("pow", vec![Value::Int(2), Value::Int(10), Value::Int(1000)]).unwrap(), Value::Int(24));
        assert_eq!(call("pow", vec![Value::Int(2), Value::Int(3), Value::Int(-5)]).unwrap(), Value::Int(-2));
        assert!(call("pow", vec![Value::Int(2), Value::Int(3), Value::Int(0)]).is_err());
        assert_eq!(call("pow", vec![Value::Int(2), Value::Int(3)]).unwrap(), Value::Int(8));
    }

    #[test]
    fn conversions() {
        assert_eq!(call("int", vec![Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert_eq!(call("abs", vec![Value::Complex(Complex64::new(3.0, 4.0))]).unwrap(), Value::Float(5.0));
        assert_eq!(
            call("complex", vec![Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Complex(Complex64::new(1.0, 2.0))
        );
        assert_eq!(call("sum", vec![Value::Int(1), Value::Float(0.5)]).unwrap(), Value::Float(1.5));
        assert!(call("int", vec![Value::Complex(Complex64::new(1.0, 0.0))]).is_err());
    }
}
