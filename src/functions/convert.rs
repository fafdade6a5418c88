//! `convert(source_unit, dest_unit, value)`: length unit conversion.

use super::{expect_arity, EvaluatorConstructor, Registry};
use crate::context::Context;
use crate::errors::{ConstructError, EvalError};
use crate::evaluator::{as_number, ContextSlot, Evaluator};
use crate::expression::{Argument, Expression};
use crate::tuple::Tuple;
use crate::units::{ConversionTable, Unit};
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::trace;

/// A unit argument after normalization. Unknown names are kept so that
/// evaluation can report them on the no-conversion path.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitToken {
    canonical: String,
    unit: Option<Unit>,
}

impl UnitToken {
    pub fn new(token: &str) -> Self {
        let unit = token.parse::<Unit>().ok();
        let canonical = match unit {
            Some(u) => u.canonical_name().to_string(),
            None => token.trim().to_uppercase(),
        };
        Self { canonical, unit }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }
}

#[derive(Debug)]
pub struct ConversionEvaluator {
    expression: String,
    from: UnitToken,
    to: UnitToken,
    value: Box<dyn Evaluator>,
    context: ContextSlot,
}

impl ConversionEvaluator {
    pub fn from_unit(&self) -> &UnitToken {
        &self.from
    }

    pub fn to_unit(&self) -> &UnitToken {
        &self.to
    }

    fn factor(&self) -> Option<f64> {
        ConversionTable::global().lookup(self.from.unit?, self.to.unit?)
    }
}

impl Evaluator for ConversionEvaluator {
    fn set_context(&mut self, context: Arc<Context>) {
        self.value.set_context(Arc::clone(&context));
        self.context.bind(context);
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Value, EvalError> {
        let ctx = self.context.get(|| self.expression.clone())?;

        let operand = self.value.evaluate(tuple).map_err(|e| EvalError::Argument {
            expression: self.expression.clone(),
            index: 2,
            source: Box::new(e),
        })?;
        let v = as_number(&operand).ok_or_else(|| EvalError::NotANumber {
            expression: self.expression.clone(),
            found: operand.to_string(),
        })?;

        let factor = self.factor().ok_or_else(|| EvalError::NoConversion {
            from: self.from.canonical.clone(),
            to: self.to.canonical.clone(),
        })?;

        let result = v * factor;
        trace!(context = ?ctx.id(), expression = %self.expression, v, result, "converted");
        Number::from_f64(result)
            .map(Value::Number)
            .ok_or_else(|| EvalError::NonFinite { expression: self.expression.clone() })
    }

    fn to_expression(&self) -> String {
        self.expression.clone()
    }
}

pub struct Convert;

impl EvaluatorConstructor for Convert {
    fn construct(
        &self,
        expression: &Expression,
        registry: &Registry,
    ) -> Result<Box<dyn Evaluator>, ConstructError> {
        expect_arity(expression, 3)?;
        let from = unit_token(expression, 0, registry)?;
        let to = unit_token(expression, 1, registry)?;
        let value = registry.construct_argument(expression, 2)?;
        Ok(Box::new(ConversionEvaluator {
            expression: expression.to_string(),
            from,
            to,
            value,
            context: ContextSlot::default(),
        }))
    }
}

/// Unit positions take any literal token (bare name, quoted string, number,
/// keyword) or a literal call such as `raw(meters)`. Tokens that name no unit
/// still construct and fail on lookup at evaluation.
fn unit_token(
    expression: &Expression,
    index: usize,
    registry: &Registry,
) -> Result<UnitToken, ConstructError> {
    match &expression.arguments[index] {
        Argument::Field(name) => Ok(UnitToken::new(name)),
        Argument::Literal(value) => Ok(UnitToken::new(&token_text(value))),
        Argument::Nested(_) => {
            let evaluator = registry.construct_argument(expression, index)?;
            match evaluator.literal() {
                Some(value) => Ok(UnitToken::new(&token_text(value))),
                None => Err(ConstructError::Malformed {
                    expression: expression.to_string(),
                    reason: format!("argument {index} must be a unit name"),
                }),
            }
        }
    }
}

fn token_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
