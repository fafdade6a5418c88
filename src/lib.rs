//! Function-call expressions evaluated against tuples.
//!
//! Text such as `convert(inches, meters, len)` is parsed into an
//! [`Expression`] tree, resolved against a [`Registry`] of named constructors
//! into an [`Evaluator`] tree, bound to a [`Context`], and then evaluated
//! against any number of [`Tuple`]s.
//!
//! ```
//! use stream_eval::{eval, Tuple};
//! use serde_json::json;
//!
//! let out = eval("convert(inches, centimeters, width)", &Tuple::new().with("width", 2)).unwrap();
//! assert_eq!(out, json!(2.0 * 2.54));
//! ```

pub mod context;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod expression;
pub mod functions;
mod parser;
pub mod tuple;
pub mod units;

use serde_json::Value;

pub use context::Context;
pub use engine::Engine;
pub use errors::{ConfigError, ConstructError, Error, EvalError, ParseError, Result};
pub use evaluator::Evaluator;
pub use expression::{parse_expression, Argument, Expression};
pub use functions::{EvaluatorConstructor, Registry};
pub use tuple::Tuple;
pub use units::{ConversionTable, Unit};

/// Convenience: evaluate `expr` against `tuple` with the built-in registry
/// and an empty context.
pub fn eval(expr: &str, tuple: &Tuple) -> Result<Value> {
    Engine::default().eval(expr, tuple)
}
