use crate::context::Context;
use crate::errors::EvalError;
use crate::evaluator::{ContextSlot, Evaluator};
use crate::tuple::Tuple;
use serde_json::Value;
use std::sync::Arc;

/// Reads one field from the tuple; absent fields evaluate to `null`.
#[derive(Debug, Clone)]
pub struct FieldValueEvaluator {
    field: String,
    context: ContextSlot,
}

impl FieldValueEvaluator {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into(), context: ContextSlot::default() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Evaluator for FieldValueEvaluator {
    fn set_context(&mut self, context: Arc<Context>) {
        self.context.bind(context);
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Value, EvalError> {
        self.context.get(|| self.field.clone())?;
        Ok(tuple.get(&self.field).cloned().unwrap_or(Value::Null))
    }

    fn to_expression(&self) -> String {
        self.field.clone()
    }
}
