// src/expression.rs
use crate::errors::ParseError;
use crate::parser::Parser;
use itertools::Itertools;
use serde_json::Value;
use std::fmt;

/// Parsed function call: `name(arg, arg, ...)`. Purely syntactic; nothing
/// here knows which functions exist or how many arguments they take.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub name: String,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Number, quoted string, `true`, `false` or `null`.
    Literal(Value),
    /// Bare identifier not followed by `(`.
    Field(String),
    Nested(Expression),
}

impl Expression {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self { name: name.into(), arguments }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.arguments.iter().join(", "))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // serde_json renders strings quoted and escaped, numbers bare
            Argument::Literal(v) => write!(f, "{v}"),
            Argument::Field(name) => f.write_str(name),
            Argument::Nested(e) => write!(f, "{e}"),
        }
    }
}

/// Parse expression text into an [`Expression`] tree. The top level must be
/// a function call and nothing may follow it.
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    let mut p = Parser::new(input);
    p.skip_ws();
    let name = p.parse_identifier()?;
    let expr = parse_call(&mut p, name)?;
    p.skip_ws();
    if !p.eof() {
        return Err(ParseError::new("trailing input", p.offset()));
    }
    Ok(expr)
}

fn parse_call(p: &mut Parser, name: String) -> Result<Expression, ParseError> {
    p.skip_ws();
    p.expect('(')?;
    let arguments = parse_args(p)?;
    p.skip_ws();
    p.expect(')')?;
    Ok(Expression { name, arguments })
}

fn parse_args(p: &mut Parser) -> Result<Vec<Argument>, ParseError> {
    let mut out = Vec::new();
    p.skip_ws();
    if p.peek_char() == Some(')') {
        return Ok(out);
    }
    loop {
        out.push(parse_argument(p)?);
        p.skip_ws();
        if p.consume_char(',') {
            continue;
        }
        break;
    }
    Ok(out)
}

fn parse_argument(p: &mut Parser) -> Result<Argument, ParseError> {
    p.skip_ws();
    match p.peek_char() {
        Some('"') | Some('\'') => Ok(Argument::Literal(Value::String(p.parse_quoted_string()?))),
        Some(c) if c == '-' || c.is_ascii_digit() => Ok(Argument::Literal(p.parse_number_literal()?)),
        Some(',') | Some(')') | None => Err(ParseError::new("argument expected", p.offset())),
        Some(_) => {
            let ident = p.parse_identifier()?;
            if p.peek_after_ws() == Some('(') {
                return Ok(Argument::Nested(parse_call(p, ident)?));
            }
            Ok(match ident.as_str() {
                "true" => Argument::Literal(Value::Bool(true)),
                "false" => Argument::Literal(Value::Bool(false)),
                "null" => Argument::Literal(Value::Null),
                _ => Argument::Field(ident),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_convert_call_in_order() {
        let e = parse_expression("convert(inches, meters, 2)").unwrap();
        assert_eq!(
            e,
            Expression::new(
                "convert",
                vec![
                    Argument::Field("inches".into()),
                    Argument::Field("meters".into()),
                    Argument::Literal(json!(2)),
                ]
            )
        );
    }

    #[test]
    fn nested_calls_and_whitespace() {
        let e = parse_expression("  convert ( raw(miles) ,kilometers,  convert(feet, meters, len) ) ").unwrap();
        assert_eq!(e.arity(), 3);
        match &e.arguments[0] {
            Argument::Nested(inner) => {
                assert_eq!(inner.name, "raw");
                assert_eq!(inner.arguments, vec![Argument::Field("miles".into())]);
            }
            other => panic!("expected nested call, got {other:?}"),
        }
        assert!(matches!(&e.arguments[2], Argument::Nested(n) if n.name == "convert"));
    }

    #[test]
    fn literal_keywords_and_strings() {
        let e = parse_expression(r#"f(true, false, null, "a b", -1.5)"#).unwrap();
        assert_eq!(
            e.arguments,
            vec![
                Argument::Literal(json!(true)),
                Argument::Literal(json!(false)),
                Argument::Literal(Value::Null),
                Argument::Literal(json!("a b")),
                Argument::Literal(json!(-1.5)),
            ]
        );
    }

    #[test]
    fn empty_argument_list() {
        let e = parse_expression("now()").unwrap();
        assert_eq!(e.arity(), 0);
        assert_eq!(e.to_string(), "now()");
    }

    #[test]
    fn display_is_canonical() {
        let e = parse_expression("convert(  inches,centimeters ,'x' , g( 2 ))").unwrap();
        assert_eq!(e.to_string(), r#"convert(inches, centimeters, "x", g(2))"#);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(parse_expression("convert(inches, meters").is_err());
        assert!(parse_expression("convert(a,,b)").is_err());
        assert!(parse_expression("convert(a,)").is_err());
        assert!(parse_expression("inches").is_err());
        assert!(parse_expression("").is_err());
        assert_eq!(
            parse_expression("9convert(a)").unwrap_err(),
            ParseError::new("identifier expected", 0)
        );
        let err = parse_expression("f(a) g").unwrap_err();
        assert_eq!(err, ParseError::new("trailing input", 5));
    }
}
