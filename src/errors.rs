use thiserror::Error;

/// Syntax error raised while scanning expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self { message: message.into(), offset }
    }
}

/// Setup-time registry misconfiguration. Not recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("function '{0}' is already registered")]
    DuplicateFunction(String),
}

/// Failure to turn expression text into a bound evaluator tree.
/// Always raised before any tuple is evaluated.
#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid expression {expression} - expecting {expected} values but found {found}")]
    Arity {
        expression: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid expression {expression} - {reason}")]
    Malformed { expression: String, reason: String },

    #[error("unknown function '{name}' in {expression}")]
    UnknownFunction { name: String, expression: String },

    // Wraps the failure of a nested argument so the chain names every level.
    #[error("unable to construct argument {index} of {expression}")]
    Argument {
        expression: String,
        index: usize,
        #[source]
        source: Box<ConstructError>,
    },
}

/// Failure while evaluating a bound evaluator against a tuple.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no context bound to {expression} - call set_context before evaluate")]
    ContextNotBound { expression: String },

    #[error("{expression} expected a number but found {found}")]
    NotANumber { expression: String, found: String },

    #[error("No conversion available from {from} to {to}")]
    NoConversion { from: String, to: String },

    #[error("{expression} produced a non-finite result")]
    NonFinite { expression: String },

    #[error("unable to evaluate argument {index} of {expression}")]
    Argument {
        expression: String,
        index: usize,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Innermost error of an [`EvalError::Argument`] chain.
    pub fn root_cause(&self) -> &EvalError {
        match self {
            EvalError::Argument { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl ConstructError {
    /// Innermost error of a [`ConstructError::Argument`] chain.
    pub fn root_cause(&self) -> &ConstructError {
        match self {
            ConstructError::Argument { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Construct(#[from] ConstructError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

// Type alias for results that use the crate-wide `Error`
pub type Result<T> = std::result::Result<T, Error>;
