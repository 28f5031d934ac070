//! Small arithmetic evaluator for the `math` functional keyword.
//!
//! Grammar (recursive descent):
//!   expr   := term (('+' | '-') term)*
//!   term   := unary (('*' | '/' | '%') unary)*
//!   unary  := '-' unary | atom
//!   atom   := number | '(' expr ')'

use crate::error::{ParleyError, Result};

const MAX_DEPTH: usize = 64;

pub fn evaluate(expression: &str) -> Result<f64> {
    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
        depth: 0,
    };
    if expression.trim().is_empty() {
        return Err(fail("empty expression"));
    }

    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(fail(format!("unexpected '{}'", c)));
    }
    if !value.is_finite() {
        return Err(fail("result is not a finite number"));
    }
    Ok(value)
}

/// Integral results print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn fail(msg: impl Into<String>) -> ParleyError {
    ParleyError::Evaluation(msg.into())
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Next non-whitespace character, without consuming it.
    fn peek(&mut self) -> Option<char> {
        while matches!(self.chars.get(self.pos), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.bump();
                    value += self.term()?;
                }
                '-' => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.bump();
                    value *= self.unary()?;
                }
                '/' | '%' => {
                    self.bump();
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(fail("division by zero"));
                    }
                    value = if op == '/' { value / rhs } else { value % rhs };
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64> {
        if self.peek() == Some('-') {
            self.bump();
            return self.nested(|p| p.unary()).map(|v| -v);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<f64> {
        match self.peek() {
            Some('(') => {
                self.bump();
                let value = self.nested(|p| p.expr())?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => Err(fail("missing ')'")),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(fail(format!("unexpected '{}'", c))),
            None => Err(fail("unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit() || *c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| fail(format!("invalid number '{}'", literal)))
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64>) -> Result<f64> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(fail("expression nested too deeply"));
        }
        let value = f(self);
        self.depth -= 1;
        value
    }
}
