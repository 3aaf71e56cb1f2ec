use clap::Parser;
use rpncalc::{Calculator, Trace, Value};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Command-line calculator: integers, floats, complex numbers and math functions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Expression string to evaluate; starts an interactive prompt when omitted
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Additional modules to use (cmath, statistics, ...)
    #[arg(short = 'm', long = "use-modules", num_args = 0.., value_name = "MODULE")]
    use_modules: Vec<String>,

    /// Print the preprocessed expression, tokens and RPN to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Output result in JSON format with type and timing
    #[arg(long)]
    output_json: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rpncalc=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let calculator = Calculator::new();
    let Some(expr) = args.expression.as_deref() else {
        repl(&calculator, &args.use_modules);
        return;
    };

    let start_time = Instant::now();
    let result = calculator.trace(expr, &args.use_modules);
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(trace) => {
            if args.output_json {
                println!("{}", format_json_output(&trace, execution_time_ms, args.verbose));
            } else {
                println!("{}", trace.result);
            }
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read-evaluate-print until end of input. Errors are reported and the prompt comes back.
fn repl(calculator: &Calculator, modules: &[String]) {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!(">>");
        if io::stdout().flush().is_err() {
            return;
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        match calculator.evaluate(&line, modules) {
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("ERROR: {}", e),
        }
    }
}

fn format_json_output(trace: &Trace, execution_time_ms: f64, verbose: bool) -> String {
    let result_value = match trace.result {
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        // JSON has no NaN/inf; fall back to the display form
        Value::Float(f) if !f.is_finite() => json!(trace.result.to_string()),
        Value::Float(f) => json!(f),
        Value::Complex(c) => json!([c.re, c.im]),
    };

    let mut output = json!({
        "result": result_value,
        "type": trace.result.type_name(),
        "display": trace.result.to_string(),
        "execution_time": format!("{:.2} ms", execution_time_ms)
    });
    if verbose {
        output["expr"] = json!(trace.expr);
        output["tokens"] = serde_json::to_value(&trace.tokens).unwrap_or_default();
        output["rpn"] = serde_json::to_value(&trace.rpn).unwrap_or_default();
    }

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
