use crate::custom::{real_arg, NativeFunction};
use crate::error::Error;
use crate::registry::Namespace;
use crate::types::Value;
use num_complex::Complex64;
use std::f64::consts::{E, PI, TAU};

pub const CMATH: &str = "cmath";

/// Complex-valued math; opt-in with `-m cmath`.
pub fn namespace() -> Namespace {
    let unary: [(&'static str, fn(&[Value]) -> Result<Value, Error>); 10] = [
        ("sqrt", |a| complex_fn(a, Complex64::sqrt)),
        ("exp", |a| complex_fn(a, Complex64::exp)),
        ("log10", |a| complex_log(a, Some(10.0))),
        ("sin", |a| complex_fn(a, Complex64::sin)),
        ("cos", |a| complex_fn(a, Complex64::cos)),
        ("tan", |a| complex_fn(a, Complex64::tan)),
        ("sinh", |a| complex_fn(a, Complex64::sinh)),
        ("cosh", |a| complex_fn(a, Complex64::cosh)),
        ("tanh", |a| complex_fn(a, Complex64::tanh)),
        ("conjugate", |a| complex_fn(a, |z| z.conj())),
    ];

    let mut ns = Namespace::new(CMATH)
        .with_constant("pi", Value::Float(PI))
        .with_constant("e", Value::Float(E))
        .with_constant("tau", Value::Float(TAU))
        .with_constant("inf", Value::Float(f64::INFINITY))
        .with_constant("nan", Value::Float(f64::NAN))
        .with_constant("infj", Value::Complex(Complex64::new(0.0, f64::INFINITY)))
        .with_constant("nanj", Value::Complex(Complex64::new(0.0, f64::NAN)));
    for (name, body) in unary {
        ns = ns.with_function(NativeFunction::new(name, 1, Some(1), body));
    }

    ns.with_function(NativeFunction::new("log", 1, Some(2), log))
        .with_function(NativeFunction::new("phase", 1, Some(1), |a| {
            Ok(Value::Float(arg(a, 0).arg()))
        }))
        .with_function(NativeFunction::new("real", 1, Some(1), |a| Ok(Value::Float(arg(a, 0).re))))
        .with_function(NativeFunction::new("imag", 1, Some(1), |a| Ok(Value::Float(arg(a, 0).im))))
        .with_function(NativeFunction::new("rect", 2, Some(2), |a| {
            let r = real_arg("rect", a, 0)?;
            let phi = real_arg("rect", a, 1)?;
            Ok(Value::Complex(Complex64::from_polar(r, phi)))
        }))
        .with_function(NativeFunction::new("isfinite", 1, Some(1), |a| {
            Ok(Value::Bool(arg(a, 0).is_finite()))
        }))
        .with_function(NativeFunction::new("isinf", 1, Some(1), |a| {
            Ok(Value::Bool(arg(a, 0).is_infinite()))
        }))
        .with_function(NativeFunction::new("isnan", 1, Some(1), |a| {
            Ok(Value::Bool(arg(a, 0).is_nan()))
        }))
}

fn arg(args: &[Value], i: usize) -> Complex64 {
    args.get(i).map_or(Complex64::new(0.0, 0.0), Value::as_complex)
}

fn complex_fn(args: &[Value], f: fn(Complex64) -> Complex64) -> Result<Value, Error> {
    Ok(Value::Complex(f(arg(args, 0))))
}

fn complex_log(args: &[Value], base: Option<f64>) -> Result<Value, Error> {
    let z = arg(args, 0);
    if z.re == 0.0 && z.im == 0.0 {
        return Err(Error::domain());
    }
    Ok(Value::Complex(match base {
        Some(b) => z.ln() / b.ln(),
        None => z.ln(),
    }))
}

fn log(args: &[Value]) -> Result<Value, Error> {
    if args.len() < 2 {
        return complex_log(args, None);
    }
    let base = arg(args, 1);
    if base.re == 0.0 && base.im == 0.0 {
        return Err(Error::domain());
    }
    let denominator = base.ln();
    if denominator.re == 0.0 && denominator.im == 0.0 {
        return Err(Error::division_by_zero());
    }
    let z = arg(args, 0);
    if z.re == 0.0 && z.im == 0.0 {
        return Err(Error::domain());
    }
    Ok(Value::Complex(z.ln() / denominator))
}
