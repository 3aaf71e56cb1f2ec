use crate::custom::{real_arg, NativeFunction};
use crate::error::Error;
use crate::registry::Namespace;
use crate::runtime::arithmetic::values_equal;
use crate::types::Value;

pub const STATISTICS: &str = "statistics";

/// Descriptive statistics over the call's arguments; opt-in with `-m statistics`.
pub fn namespace() -> Namespace {
    Namespace::new(STATISTICS)
        .with_function(NativeFunction::new("mean", 0, None, mean))
        .with_function(NativeFunction::new("median", 0, None, median))
        .with_function(NativeFunction::new("median_low", 0, None, |a| median_pick("median_low", a, true)))
        .with_function(NativeFunction::new("median_high", 0, None, |a| median_pick("median_high", a, false)))
        .with_function(NativeFunction::new("mode", 0, None, mode))
        .with_function(NativeFunction::new("variance", 0, None, |a| variance("variance", a, true).map(Value::Float)))
        .with_function(NativeFunction::new("stdev", 0, None, |a| {
            variance("stdev", a, true).map(|v| Value::Float(v.sqrt()))
        }))
        .with_function(NativeFunction::new("pvariance", 0, None, |a| variance("pvariance", a, false).map(Value::Float)))
        .with_function(NativeFunction::new("pstdev", 0, None, |a| {
            variance("pstdev", a, false).map(|v| Value::Float(v.sqrt()))
        }))
}

fn collect_nums(name: &str, args: &[Value], at_least: usize) -> Result<Vec<f64>, Error> {
    if args.len() < at_least {
        return Err(Error::Arithmetic(if at_least == 1 {
            format!("{}() requires at least one data point", name)
        } else {
            format!("{}() requires at least {} data points", name, at_least)
        }));
    }
    (0..args.len()).map(|i| real_arg(name, args, i)).collect()
}

fn mean(args: &[Value]) -> Result<Value, Error> {
    let nums = collect_nums("mean", args, 1)?;
    Ok(Value::Float(nums.iter().sum::<f64>() / nums.len() as f64))
}

fn sorted(name: &str, args: &[Value]) -> Result<Vec<(f64, Value)>, Error> {
    let nums = collect_nums(name, args, 1)?;
    let mut pairs: Vec<(f64, Value)> = nums.into_iter().zip(args.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(pairs)
}

fn median(args: &[Value]) -> Result<Value, Error> {
    let data = sorted("median", args)?;
    let len = data.len();
    if len % 2 == 1 {
        Ok(data[len / 2].1)
    } else {
        Ok(Value::Float((data[len / 2 - 1].0 + data[len / 2].0) / 2.0))
    }
}

fn median_pick(name: &str, args: &[Value], low: bool) -> Result<Value, Error> {
    let data = sorted(name, args)?;
    let len = data.len();
    let i = if len % 2 == 1 || !low { len / 2 } else { len / 2 - 1 };
    Ok(data[i].1)
}

/// Most common value; ties go to the one seen first.
fn mode(args: &[Value]) -> Result<Value, Error> {
    collect_nums("mode", args, 1)?;
    let mut best = args[0];
    let mut best_count = 0;
    for v in args {
        let count = args.iter().filter(|w| values_equal(**w, *v)).count();
        if count > best_count {
            best = *v;
            best_count = count;
        }
    }
    Ok(best)
}

fn variance(name: &str, args: &[Value], sample: bool) -> Result<f64, Error> {
    let nums = collect_nums(name, args, if sample { 2 } else { 1 })?;
    let n = nums.len() as f64;
    let mean = nums.iter().sum::<f64>() / n;
    let ss = nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    Ok(ss / if sample { n - 1.0 } else { n })
}
