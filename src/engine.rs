use crate::context::Context;
use crate::errors::{Error, Result};
use crate::evaluator::Evaluator;
use crate::functions::Registry;
use crate::tuple::Tuple;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A registry paired with the context every compiled tree gets bound to.
#[derive(Clone)]
pub struct Engine {
    registry: Registry,
    context: Arc<Context>,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self { registry, context: Arc::new(Context::default()) }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Arc::new(context);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Construct the evaluator tree for `text` and bind it to this engine's context.
    pub fn compile(&self, text: &str) -> Result<Box<dyn Evaluator>> {
        let mut evaluator = self.registry.construct_evaluator(text)?;
        evaluator.set_context(Arc::clone(&self.context));
        debug!(context = ?self.context.id(), expression = %evaluator.to_expression(), "compiled");
        Ok(evaluator)
    }

    pub fn eval(&self, text: &str, tuple: &Tuple) -> Result<Value> {
        Ok(self.compile(text)?.evaluate(tuple)?)
    }

    /// Compile once, then evaluate each tuple in turn. Construction errors
    /// are returned up front; evaluation errors are reported per tuple.
    pub fn eval_stream<I>(&self, text: &str, tuples: I) -> Result<impl Iterator<Item = Result<Value>>>
    where
        I: IntoIterator<Item = Tuple>,
    {
        let evaluator = self.compile(text)?;
        Ok(tuples
            .into_iter()
            .map(move |tuple| evaluator.evaluate(&tuple).map_err(Error::from)))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Registry::with_builtins())
    }
}
