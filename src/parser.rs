// src/parser.rs
use crate::errors::ParseError;
use serde_json::Value;

/// Character-level scanner over expression text.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.i)
    }

    pub fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        if self.peek_char().map_or(true, |c| c.is_ascii_digit()) {
            return Err(self.error("identifier expected"));
        }
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(self.error("identifier expected"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.i - start
    }

    /// `-? digits (. digits)? ([eE] [+-]? digits)?`. Digit-only tokens become
    /// `i64`, then `u64`, then `f64`, whichever first holds the value.
    pub fn parse_number_literal(&mut self) -> Result<Value, ParseError> {
        let start = self.i;
        self.consume_char('-');
        let mut digits = self.skip_digits();
        let mut integral = true;
        if self.consume_char('.') {
            integral = false;
            digits += self.skip_digits();
        }
        if digits == 0 {
            return Err(ParseError::new("number expected", start));
        }
        if self.consume_char('e') || self.consume_char('E') {
            integral = false;
            if !self.consume_char('+') {
                self.consume_char('-');
            }
            if self.skip_digits() == 0 {
                return Err(self.error("exponent digits expected"));
            }
        }
        let s = &self.s[start..self.i];
        if integral {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::from(i));
            }
            if let Ok(u) = s.parse::<u64>() {
                return Ok(Value::from(u));
            }
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::from(f)),
            _ => Err(ParseError::new(format!("number out of range '{s}'"), start)),
        }
    }

    pub fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let quote = self.peek_char().ok_or_else(|| self.error("string expected"))?;
        if quote != '\'' && quote != '"' {
            return Err(self.error("expected quoted string"));
        }
        let start = self.i;
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(ParseError::new("unterminated string", start))
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    /// Looks past the current token's trailing whitespace without consuming it.
    pub fn peek_after_ws(&self) -> Option<char> {
        self.s[self.i..].chars().find(|c| !c.is_whitespace())
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn offset(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
