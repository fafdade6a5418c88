use crate::context::Context;
use crate::errors::EvalError;
use crate::tuple::Tuple;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A constructed, validated node of an evaluator tree.
///
/// Arity and argument roles are fixed at construction. The only mutation an
/// evaluator accepts afterwards is (re)binding its execution context, which
/// must happen before the first call to [`Evaluator::evaluate`].
pub trait Evaluator: Send + Sync + fmt::Debug {
    /// Bind `context` to this evaluator and every child it owns.
    fn set_context(&mut self, context: Arc<Context>);

    /// Compute a value from `tuple`. Deterministic for a given tuple and context.
    fn evaluate(&self, tuple: &Tuple) -> Result<Value, EvalError>;

    /// Canonical expression text this evaluator was built from.
    fn to_expression(&self) -> String;

    /// Construction-time constant, if this evaluator is one.
    fn literal(&self) -> Option<&Value> {
        None
    }
}

/// Holds the bound context of a single evaluator.
#[derive(Debug, Clone, Default)]
pub struct ContextSlot(Option<Arc<Context>>);

impl ContextSlot {
    pub fn bind(&mut self, context: Arc<Context>) {
        self.0 = Some(context);
    }

    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    /// The bound context, or [`EvalError::ContextNotBound`] naming `expression`.
    pub fn get(&self, expression: impl FnOnce() -> String) -> Result<&Context, EvalError> {
        self.0
            .as_deref()
            .ok_or_else(|| EvalError::ContextNotBound { expression: expression() })
    }
}

/// Numeric view of a value; only JSON numbers qualify.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
