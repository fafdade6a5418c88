use crate::errors::{ConfigError, ConstructError};
use crate::evaluator::Evaluator;
use crate::expression::{parse_expression, Argument, Expression};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub mod convert;
pub mod field;
pub mod raw;

pub use convert::{Convert, ConversionEvaluator};
pub use field::FieldValueEvaluator;
pub use raw::{Raw, RawValueEvaluator};

/// Builds an evaluator for one registered function name.
///
/// Implementations validate the call's arity and argument shapes and use
/// `registry` to construct any child evaluators they need.
pub trait EvaluatorConstructor: Send + Sync {
    fn construct(
        &self,
        expression: &Expression,
        registry: &Registry,
    ) -> Result<Box<dyn Evaluator>, ConstructError>;
}

impl<F> EvaluatorConstructor for F
where
    F: Fn(&Expression, &Registry) -> Result<Box<dyn Evaluator>, ConstructError> + Send + Sync,
{
    fn construct(
        &self,
        expression: &Expression,
        registry: &Registry,
    ) -> Result<Box<dyn Evaluator>, ConstructError> {
        self(expression, registry)
    }
}

/// Thread-safe function registry. Populate at startup, then share clones.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn EvaluatorConstructor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut map: HashMap<String, Arc<dyn EvaluatorConstructor>> = HashMap::new();
        map.insert("convert".to_string(), Arc::new(Convert));
        map.insert("raw".to_string(), Arc::new(Raw));
        Self { inner: Arc::new(map) }
    }

    pub fn register<C: EvaluatorConstructor + 'static>(
        &mut self,
        name: impl Into<String>,
        constructor: C,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.inner.contains_key(&name) {
            return Err(ConfigError::DuplicateFunction(name));
        }
        debug!(function = %name, "registering evaluator constructor");
        Arc::make_mut(&mut self.inner).insert(name, Arc::new(constructor));
        Ok(())
    }

    pub fn with_function<C: EvaluatorConstructor + 'static>(
        mut self,
        name: impl Into<String>,
        constructor: C,
    ) -> Result<Self, ConfigError> {
        self.register(name, constructor)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse `text` and build the evaluator tree it describes.
    pub fn construct_evaluator(&self, text: &str) -> Result<Box<dyn Evaluator>, ConstructError> {
        let expression = parse_expression(text)?;
        self.construct(&expression)
    }

    pub fn construct(&self, expression: &Expression) -> Result<Box<dyn Evaluator>, ConstructError> {
        let constructor = self.inner.get(&expression.name).ok_or_else(|| {
            ConstructError::UnknownFunction {
                name: expression.name.clone(),
                expression: expression.to_string(),
            }
        })?;
        debug!(%expression, "constructing evaluator");
        constructor.construct(expression, self)
    }

    /// Child evaluator for the argument at `index`: literals pass through
    /// unevaluated, bare identifiers read tuple fields, nested calls recurse.
    pub fn construct_argument(
        &self,
        expression: &Expression,
        index: usize,
    ) -> Result<Box<dyn Evaluator>, ConstructError> {
        match expression.arguments.get(index) {
            Some(Argument::Literal(value)) => Ok(Box::new(RawValueEvaluator::new(value.clone()))),
            Some(Argument::Field(name)) => Ok(Box::new(FieldValueEvaluator::new(name.clone()))),
            Some(Argument::Nested(inner)) => {
                self.construct(inner).map_err(|e| ConstructError::Argument {
                    expression: expression.to_string(),
                    index,
                    source: Box::new(e),
                })
            }
            None => Err(ConstructError::Malformed {
                expression: expression.to_string(),
                reason: format!("missing argument {index}"),
            }),
        }
    }
}

/// Fails with [`ConstructError::Arity`] unless `expression` has exactly `expected` arguments.
pub fn expect_arity(expression: &Expression, expected: usize) -> Result<(), ConstructError> {
    if expression.arity() != expected {
        return Err(ConstructError::Arity {
            expression: expression.to_string(),
            expected,
            found: expression.arity(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::tuple::Tuple;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn builtins_are_registered() {
        let r = Registry::with_builtins();
        assert_eq!(r.names(), vec!["convert", "raw"]);
        assert!(r.contains("convert"));
        assert!(!r.contains("year"));
    }

    #[test]
    fn duplicate_registration_is_a_config_error() {
        let mut r = Registry::with_builtins();
        let err = r.register("raw", Raw).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateFunction("raw".into()));
    }

    #[test]
    fn register_does_not_affect_existing_clones() {
        let base = Registry::new();
        let extended = base.clone().with_function("raw", Raw).unwrap();
        assert!(!base.contains("raw"));
        assert!(extended.contains("raw"));
    }

    #[test]
    fn unknown_function_fails_at_construction() {
        let err = Registry::with_builtins().construct_evaluator("year(date)").unwrap_err();
        assert!(matches!(err, ConstructError::UnknownFunction { ref name, .. } if name == "year"));
    }

    #[test]
    fn nested_unknown_function_is_wrapped_with_position() {
        let err = Registry::with_builtins()
            .construct_evaluator("convert(inches, meters, year(date))")
            .unwrap_err();
        match &err {
            ConstructError::Argument { expression, index, .. } => {
                assert_eq!(expression, "convert(inches, meters, year(date))");
                assert_eq!(*index, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(err.root_cause(), ConstructError::UnknownFunction { .. }));
    }

    #[test]
    fn parse_errors_surface_as_construct_errors() {
        let err = Registry::with_builtins().construct_evaluator("convert(inches").unwrap_err();
        assert!(matches!(err, ConstructError::Parse(_)));
    }

    #[test]
    fn closures_can_be_registered() {
        let registry = Registry::new()
            .with_function("first", |e: &Expression, r: &Registry| -> Result<Box<dyn Evaluator>, ConstructError> {
                expect_arity(e, 1)?;
                r.construct_argument(e, 0)
            })
            .unwrap();
        let mut ev = registry.construct_evaluator("first(size)").unwrap();
        ev.set_context(Arc::new(Context::new()));
        let out = ev.evaluate(&Tuple::new().with("size", 4)).unwrap();
        assert_eq!(out, json!(4));
    }

    #[test]
    fn expect_arity_reports_counts() {
        let e = Expression::new("f", vec![]);
        let err = expect_arity(&e, 2).unwrap_err();
        assert_eq!(err.to_string(), "Invalid expression f() - expecting 2 values but found 0");
    }
}
