use super::{expect_arity, EvaluatorConstructor, Registry};
use crate::context::Context;
use crate::errors::{ConstructError, EvalError};
use crate::evaluator::{ContextSlot, Evaluator};
use crate::expression::{Argument, Expression};
use crate::tuple::Tuple;
use serde_json::Value;
use std::sync::Arc;

/// Returns its construction-time token unchanged; never reads the tuple.
#[derive(Debug, Clone)]
pub struct RawValueEvaluator {
    value: Value,
    text: String,
    context: ContextSlot,
}

impl RawValueEvaluator {
    /// Evaluator for a bare literal argument such as `2` or `"abc"`.
    pub fn new(value: Value) -> Self {
        let text = value.to_string();
        Self { value, text, context: ContextSlot::default() }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Evaluator for RawValueEvaluator {
    fn set_context(&mut self, context: Arc<Context>) {
        self.context.bind(context);
    }

    fn evaluate(&self, _tuple: &Tuple) -> Result<Value, EvalError> {
        self.context.get(|| self.text.clone())?;
        Ok(self.value.clone())
    }

    fn to_expression(&self) -> String {
        self.text.clone()
    }

    fn literal(&self) -> Option<&Value> {
        Some(&self.value)
    }
}

/// `raw(token)`: pass an identifier through as an opaque string value.
pub struct Raw;

impl EvaluatorConstructor for Raw {
    fn construct(
        &self,
        expression: &Expression,
        _registry: &Registry,
    ) -> Result<Box<dyn Evaluator>, ConstructError> {
        expect_arity(expression, 1)?;
        let value = match &expression.arguments[0] {
            Argument::Literal(v) => v.clone(),
            Argument::Field(name) => Value::String(name.clone()),
            Argument::Nested(_) => {
                return Err(ConstructError::Malformed {
                    expression: expression.to_string(),
                    reason: "expecting a literal token".into(),
                })
            }
        };
        Ok(Box::new(RawValueEvaluator {
            value,
            text: expression.to_string(),
            context: ContextSlot::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bound(text: &str) -> Box<dyn Evaluator> {
        let mut ev = Registry::with_builtins().construct_evaluator(text).unwrap();
        ev.set_context(Arc::new(Context::new()));
        ev
    }

    #[test]
    fn identifier_token_ignores_tuple() {
        let ev = bound("raw(meters)");
        assert_eq!(ev.evaluate(&Tuple::new()).unwrap(), json!("meters"));
        let shadowing = Tuple::new().with("meters", 12);
        assert_eq!(ev.evaluate(&shadowing).unwrap(), json!("meters"));
        assert_eq!(ev.literal(), Some(&json!("meters")));
        assert_eq!(ev.to_expression(), "raw(meters)");
    }

    #[test]
    fn literal_tokens_keep_their_type() {
        assert_eq!(bound("raw(2.5)").evaluate(&Tuple::new()).unwrap(), json!(2.5));
        assert_eq!(bound("raw('a b')").evaluate(&Tuple::new()).unwrap(), json!("a b"));
    }

    #[test]
    fn requires_exactly_one_argument() {
        let r = Registry::with_builtins();
        let err = r.construct_evaluator("raw(a, b)").unwrap_err();
        assert!(matches!(err, ConstructError::Arity { expected: 1, found: 2, .. }));
        assert!(r.construct_evaluator("raw()").is_err());
    }

    #[test]
    fn nested_call_is_malformed() {
        let err = Registry::with_builtins().construct_evaluator("raw(raw(x))").unwrap_err();
        assert!(matches!(err, ConstructError::Malformed { .. }));
    }

    #[test]
    fn unbound_evaluation_fails() {
        let ev = RawValueEvaluator::new(json!(1));
        let err = ev.evaluate(&Tuple::new()).unwrap_err();
        assert!(matches!(err, EvalError::ContextNotBound { .. }));
    }
}
