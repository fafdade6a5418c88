use clap::{ArgAction, Parser};
use serde_json::Value;
use std::io::BufRead;
use stream_eval::{ConversionTable, Context, Engine, Registry, Tuple};
use tracing::Level;

/// Evaluate a function-call expression against JSON tuples.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Expression, e.g. "convert(inches, centimeters, width)"
    #[arg(required_unless_present = "list_units")]
    expr: Option<String>,
    /// Tuple as a JSON object
    #[arg(long, default_value = "{}")]
    tuple: String,
    /// Read one JSON object per line from stdin and print one result per line
    #[arg(long, conflicts_with = "tuple")]
    stdin: bool,
    /// Label attached to log output for this run
    #[arg(long)]
    context_id: Option<String>,
    /// Context parameter as KEY=JSON (repeatable)
    #[arg(long = "param", value_name = "KEY=JSON")]
    params: Vec<String>,
    /// Print every authored unit conversion and exit
    #[arg(long)]
    list_units: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if args.list_units {
        for (from, to, factor) in ConversionTable::global().entries() {
            println!("{from} -> {to}: {factor}");
        }
        return;
    }

    // Build the context.
    let mut context = Context::new();
    if let Some(id) = args.context_id.as_ref() {
        context = context.with_id(id.clone());
    }
    for param in &args.params {
        let Some((key, raw)) = param.split_once('=') else {
            eprintln!("Invalid --param '{param}': expected KEY=JSON");
            std::process::exit(1);
        };
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        context = context.with_param(key, value);
    }

    let engine = Engine::new(Registry::with_builtins()).with_context(context);
    let expr = args.expr.unwrap_or_default();

    let evaluator = match engine.compile(&expr) {
        Ok(ev) => ev,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if !args.stdin {
        let tuple: Tuple = match serde_json::from_str(&args.tuple) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid tuple JSON: {e}");
                std::process::exit(1);
            }
        };
        match evaluator.evaluate(&tuple) {
            Ok(v) => println!("{v}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    for (n, line) in std::io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: reading stdin: {e}");
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let result = serde_json::from_str::<Tuple>(&line)
            .map_err(|e| format!("line {}: invalid tuple JSON: {e}", n + 1))
            .and_then(|t| evaluator.evaluate(&t).map_err(|e| format!("line {}: {e}", n + 1)));
        match result {
            Ok(v) => println!("{v}"),
            Err(msg) => eprintln!("error: {msg}"),
        }
    }
}
