use crate::custom::{int_arg, real_arg, NativeFunction};
use crate::error::Error;
use crate::registry::{Namespace, MATH};
use crate::runtime::arithmetic;
use crate::types::Value;
use std::f64::consts::{E, PI, TAU};

/// The core math table, always active.
pub fn namespace() -> Namespace {
    let unary: [(&'static str, fn(&[Value]) -> Result<Value, Error>); 21] = [
        ("sqrt", |a| real_fn("sqrt", a, f64::sqrt)),
        ("exp", |a| real_fn("exp", a, f64::exp)),
        ("log2", |a| log_fn("log2", a, f64::log2)),
        ("log10", |a| log_fn("log10", a, f64::log10)),
        ("log1p", |a| real_fn("log1p", a, f64::ln_1p)),
        ("expm1", |a| real_fn("expm1", a, f64::exp_m1)),
        ("sin", |a| real_fn("sin", a, f64::sin)),
        ("cos", |a| real_fn("cos", a, f64::cos)),
        ("tan", |a| real_fn("tan", a, f64::tan)),
        ("asin", |a| real_fn("asin", a, f64::asin)),
        ("acos", |a| real_fn("acos", a, f64::acos)),
        ("atan", |a| real_fn("atan", a, f64::atan)),
        ("sinh", |a| real_fn("sinh", a, f64::sinh)),
        ("cosh", |a| real_fn("cosh", a, f64::cosh)),
        ("tanh", |a| real_fn("tanh", a, f64::tanh)),
        ("asinh", |a| real_fn("asinh", a, f64::asinh)),
        ("acosh", |a| real_fn("acosh", a, f64::acosh)),
        ("atanh", |a| real_fn("atanh", a, f64::atanh)),
        ("degrees", |a| real_fn("degrees", a, f64::to_degrees)),
        ("radians", |a| real_fn("radians", a, f64::to_radians)),
        ("fabs", |a| real_fn("fabs", a, f64::abs)),
    ];

    let mut ns = Namespace::new(MATH)
        .with_constant("pi", Value::Float(PI))
        .with_constant("e", Value::Float(E))
        .with_constant("tau", Value::Float(TAU))
        .with_constant("inf", Value::Float(f64::INFINITY))
        .with_constant("nan", Value::Float(f64::NAN));
    for (name, body) in unary {
        ns = ns.with_function(NativeFunction::new(name, 1, Some(1), body));
    }

    ns.with_function(NativeFunction::new("log", 1, Some(2), log))
        .with_function(NativeFunction::new("atan2", 2, Some(2), |a| {
            Ok(Value::Float(real_arg("atan2", a, 0)?.atan2(real_arg("atan2", a, 1)?)))
        }))
        .with_function(NativeFunction::new("hypot", 0, None, hypot))
        .with_function(NativeFunction::new("ceil", 1, Some(1), |a| rounding("ceil", a, f64::ceil)))
        .with_function(NativeFunction::new("floor", 1, Some(1), |a| rounding("floor", a, f64::floor)))
        .with_function(NativeFunction::new("trunc", 1, Some(1), |a| rounding("trunc", a, f64::trunc)))
        .with_function(NativeFunction::new("factorial", 1, Some(1), factorial))
        .with_function(NativeFunction::new("gcd", 0, None, gcd))
        .with_function(NativeFunction::new("lcm", 0, None, lcm))
        .with_function(NativeFunction::new("pow", 2, Some(2), pow))
        .with_function(NativeFunction::new("fmod", 2, Some(2), fmod))
        .with_function(NativeFunction::new("copysign", 2, Some(2), |a| {
            Ok(Value::Float(real_arg("copysign", a, 0)?.copysign(real_arg("copysign", a, 1)?)))
        }))
        .with_function(NativeFunction::new("isfinite", 1, Some(1), |a| {
            Ok(Value::Bool(real_arg("isfinite", a, 0)?.is_finite()))
        }))
        .with_function(NativeFunction::new("isinf", 1, Some(1), |a| {
            Ok(Value::Bool(real_arg("isinf", a, 0)?.is_infinite()))
        }))
        .with_function(NativeFunction::new("isnan", 1, Some(1), |a| {
            Ok(Value::Bool(real_arg("isnan", a, 0)?.is_nan()))
        }))
        .with_function(NativeFunction::new("comb", 2, Some(2), comb))
        .with_function(NativeFunction::new("perm", 1, Some(2), perm))
        .with_function(NativeFunction::new("fsum", 0, None, fsum))
        .with_function(NativeFunction::new("prod", 0, None, prod))
}

/// Apply `f`; a NaN out of a non-NaN input is a domain fault.
pub(crate) fn real_fn(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, Error> {
    let x = real_arg(name, args, 0)?;
    let y = f(x);
    if y.is_nan() && !x.is_nan() {
        return Err(Error::domain());
    }
    if y.is_infinite() && x.is_finite() {
        return Err(Error::Arithmetic("math range error".to_string()));
    }
    Ok(Value::Float(y))
}

fn log_fn(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, Error> {
    let x = real_arg(name, args, 0)?;
    if x <= 0.0 {
        return Err(Error::domain());
    }
    Ok(Value::Float(f(x)))
}

fn log(args: &[Value]) -> Result<Value, Error> {
    let x = real_arg("log", args, 0)?;
    if x <= 0.0 {
        return Err(Error::domain());
    }
    match args.get(1) {
        None => Ok(Value::Float(x.ln())),
        Some(_) => {
            let base = real_arg("log", args, 1)?;
            if base <= 0.0 {
                return Err(Error::domain());
            }
            if base == 1.0 {
                return Err(Error::division_by_zero());
            }
            Ok(Value::Float(x.ln() / base.ln()))
        }
    }
}

fn hypot(args: &[Value]) -> Result<Value, Error> {
    let mut sum = 0.0;
    for i in 0..args.len() {
        let x = real_arg("hypot", args, i)?;
        if x.is_infinite() {
            return Ok(Value::Float(f64::INFINITY));
        }
        sum += x * x;
    }
    Ok(Value::Float(sum.sqrt()))
}

/// Float to int, keeping the float when it does not fit.
pub(crate) fn float_to_int(x: f64) -> Result<Value, Error> {
    if x.is_nan() {
        return Err(Error::Arithmetic("cannot convert float NaN to integer".to_string()));
    }
    if x.is_infinite() {
        return Err(Error::Arithmetic("cannot convert float infinity to integer".to_string()));
    }
    if x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Ok(Value::Int(x as i64))
    } else {
        Ok(Value::Float(x))
    }
}

fn rounding(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, Error> {
    if let Some(i) = args.first().and_then(Value::as_int) {
        return Ok(Value::Int(i));
    }
    float_to_int(f(real_arg(name, args, 0)?))
}

fn factorial(args: &[Value]) -> Result<Value, Error> {
    let n = int_arg("factorial", args, 0)?;
    if n < 0 {
        return Err(Error::Arithmetic("factorial() not defined for negative values".to_string()));
    }
    (1..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(Value::Int)
        .ok_or_else(|| Error::Arithmetic("integer overflow in factorial()".to_string()))
}

/// Non-negative gcd; `None` when it is 2^63 and does not fit an i64.
fn gcd_pair(a: i64, b: i64) -> Option<i64> {
    let (mut a, mut b) = (a as i128, b as i128);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    i64::try_from(a.abs()).ok()
}

fn gcd(args: &[Value]) -> Result<Value, Error> {
    let mut acc = 0;
    for i in 0..args.len() {
        acc = gcd_pair(acc, int_arg("gcd", args, i)?)
            .ok_or_else(|| Error::Arithmetic("integer overflow in gcd()".to_string()))?;
    }
    Ok(Value::Int(acc))
}

fn lcm(args: &[Value]) -> Result<Value, Error> {
    let overflow = || Error::Arithmetic("integer overflow in lcm()".to_string());
    let mut acc: i64 = 1;
    for i in 0..args.len() {
        let n = int_arg("lcm", args, i)?;
        if n == 0 || acc == 0 {
            acc = 0;
            continue;
        }
        let g = gcd_pair(acc, n).ok_or_else(overflow)?;
        acc = (acc / g)
            .checked_mul(n)
            .and_then(i64::checked_abs)
            .ok_or_else(overflow)?;
    }
    Ok(Value::Int(acc))
}

fn pow(args: &[Value]) -> Result<Value, Error> {
    let x = real_arg("pow", args, 0)?;
    let y = real_arg("pow", args, 1)?;
    if x == 0.0 && y < 0.0 {
        return Err(Error::domain());
    }
    if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
        return Err(Error::domain());
    }
    Ok(Value::Float(x.powf(y)))
}

fn fmod(args: &[Value]) -> Result<Value, Error> {
    let x = real_arg("fmod", args, 0)?;
    let y = real_arg("fmod", args, 1)?;
    if y == 0.0 || x.is_infinite() {
        return Err(Error::domain());
    }
    Ok(Value::Float(x % y))
}

fn comb(args: &[Value]) -> Result<Value, Error> {
    let n = int_arg("comb", args, 0)?;
    let k = int_arg("comb", args, 1)?;
    if n < 0 || k < 0 {
        return Err(Error::Arithmetic("comb() arguments must be non-negative".to_string()));
    }
    if k > n {
        return Ok(Value::Int(0));
    }
    let k = k.min(n - k);
    let mut acc: i64 = 1;
    for i in 0..k {
        // exact at every step: acc * (n - i) is divisible by (i + 1)
        acc = acc
            .checked_mul(n - i)
            .map(|v| v / (i + 1))
            .ok_or_else(|| Error::Arithmetic("integer overflow in comb()".to_string()))?;
    }
    Ok(Value::Int(acc))
}

fn perm(args: &[Value]) -> Result<Value, Error> {
    let n = int_arg("perm", args, 0)?;
    let k = if args.len() > 1 { int_arg("perm", args, 1)? } else { n };
    if n < 0 || k < 0 {
        return Err(Error::Arithmetic("perm() arguments must be non-negative".to_string()));
    }
    if k > n {
        return Ok(Value::Int(0));
    }
    ((n - k + 1)..=n)
        .try_fold(1i64, |acc, v| acc.checked_mul(v))
        .map(Value::Int)
        .ok_or_else(|| Error::Arithmetic("integer overflow in perm()".to_string()))
}

fn fsum(args: &[Value]) -> Result<Value, Error> {
    // Kahan-Babuska summation
    let mut sum = 0.0;
    let mut comp = 0.0;
    for i in 0..args.len() {
        let x = real_arg("fsum", args, i)?;
        let t = sum + x;
        if sum.abs() >= x.abs() {
            comp += (sum - t) + x;
        } else {
            comp += (x - t) + sum;
        }
        sum = t;
    }
    Ok(Value::Float(sum + comp))
}

fn prod(args: &[Value]) -> Result<Value, Error> {
    args.iter().try_fold(Value::Int(1), |acc, v| arithmetic::mul(acc, *v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, Error> {
        Registry::standard().resolver::<&str>(&[])?.call(&format!("math.{}", name), args)
    }

    #[test]
    fn domain_faults() {
        assert_eq!(call("sqrt", vec![Value::Int(-1)]), Err(Error::domain()));
        assert_eq!(call("log", vec![Value::Int(0)]), Err(Error::domain()));
        assert_eq!(call("acos", vec![Value::Int(2)]), Err(Error::domain()));
        assert!(matches!(call("exp", vec![Value::Int(1000)]), Err(Error::Arithmetic(_))));
    }

    #[test]
    fn integer_results() {
        assert_eq!(call("factorial", vec![Value::Int(5)]).unwrap(), Value::Int(120));
        assert_eq!(call("floor", vec![Value::Float(-2.5)]).unwrap(), Value::Int(-3));
        assert_eq!(call("ceil", vec![Value::Float(2.1)]).unwrap(), Value::Int(3));
        assert_eq!(call("gcd", vec![Value::Int(12), Value::Int(18)]).unwrap(), Value::Int(6));
        assert_eq!(call("lcm", vec![Value::Int(4), Value::Int(6)]).unwrap(), Value::Int(12));
        assert_eq!(call("comb", vec![Value::Int(5), Value::Int(2)]).unwrap(), Value::Int(10));
        assert_eq!(call("perm", vec![Value::Int(5), Value::Int(2)]).unwrap(), Value::Int(20));
        assert_eq!(call("prod", vec![Value::Int(2), Value::Int(3), Value::Int(4)]).unwrap(), Value::Int(24));
    }

    #[test]
    fn float_results() {
        assert_eq!(call("log", vec![Value::Int(8), Value::Int(2)]).unwrap(), Value::Float(3.0));
        assert_eq!(call("hypot", vec![Value::Int(3), Value::Int(4)]).unwrap(), Value::Float(5.0));
        assert_eq!(call("pow", vec![Value::Int(2), Value::Int(3)]).unwrap(), Value::Float(8.0));
        assert_eq!(
            call("fsum", vec![Value::Float(0.1); 10]).unwrap(),
            Value::Float(1.0)
        );
        assert_eq!(call("isnan", vec![Value::Float(f64::NAN)]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn gcd_and_lcm_at_integer_bounds() {
        let min = Value::Int(i64::MIN);
        let gcd_overflow = Err(Error::Arithmetic("integer overflow in gcd()".to_string()));
        let lcm_overflow = Err(Error::Arithmetic("integer overflow in lcm()".to_string()));
        assert_eq!(call("gcd", vec![min]), gcd_overflow);
        assert_eq!(call("gcd", vec![min, Value::Int(6)]), gcd_overflow);
        assert_eq!(call("gcd", vec![Value::Int(6), min]).unwrap(), Value::Int(2));
        assert_eq!(call("gcd", vec![min, Value::Int(-1)]), gcd_overflow);
        assert_eq!(call("gcd", vec![Value::Int(-1), min]).unwrap(), Value::Int(1));
        assert_eq!(call("gcd", vec![Value::Int(i64::MAX), Value::Int(i64::MAX)]).unwrap(), Value::Int(i64::MAX));
        assert_eq!(call("gcd", vec![Value::Int(-4), Value::Int(-6)]).unwrap(), Value::Int(2));
        assert_eq!(call("lcm", vec![min, Value::Int(3)]), lcm_overflow);
        assert_eq!(call("lcm", vec![min]), lcm_overflow);
        assert_eq!(call("lcm", vec![Value::Int(i64::MAX), Value::Int(2)]), lcm_overflow);
        assert_eq!(call("lcm", vec![Value::Int(-4), Value::Int(6)]).unwrap(), Value::Int(12));
    }

    #[test]
    fn factorial_rejects_negative_and_overflow() {
        assert!(call("factorial", vec![Value::Int(-1)]).is_err());
        assert!(call("factorial", vec![Value::Int(30)]).is_err());
        assert!(matches!(call("factorial", vec![Value::Float(3.0)]), Err(Error::Type(_))));
    }
}
