//! Arithmetic evaluation for model-written expressions
//!
//! Accepts `+ - * / ^`, parentheses, unary minus and decimal or scientific
//! literals. Models often write products as `6.022 x 10^23`, so `x` and `×`
//! are read as multiplication too. `^` is right-associative and binds
//! tighter than unary minus (`-2^2 == -4`).

use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use anyhow::Result;
use serde::Deserialize;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token after position {0}")]
    TrailingInput(usize),
    #[error("missing closing parenthesis")]
    UnclosedParen,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Nesting limit for parentheses, signs and exponents combined
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn read_number(first: char, chars: &mut Peekable<Chars<'_>>) -> Result<f64, CalcError> {
    let mut literal = String::from(first);
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            literal.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if matches!(chars.peek(), Some('e') | Some('E')) {
        let mut lookahead = chars.clone();
        lookahead.next();
        let signed = matches!(lookahead.peek(), Some('+') | Some('-'));
        if signed {
            lookahead.next();
        }
        if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
            literal.push('e');
            chars.next();
            if signed {
                if let Some(sign) = chars.next() {
                    literal.push(sign);
                }
            }
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                literal.push(c);
                chars.next();
            }
        }
    }

    literal
        .parse::<f64>()
        .map_err(|_| CalcError::InvalidNumber(literal))
}

fn tokenize(expression: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            c if c.is_ascii_digit() || c == '.' => Token::Number(read_number(c, &mut chars)?),
            '+' => Token::Plus,
            '-' | '−' => Token::Minus,
            '*' | 'x' | 'X' | '×' => Token::Star,
            '/' | '÷' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(CalcError::UnexpectedChar(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else if rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    // Every recursive path (parentheses, signs, exponents) passes through here
    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(CalcError::UnclosedParen),
                }
            }
            Some(_) => Err(CalcError::TrailingInput(self.pos - 1)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::UnexpectedEnd);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if parser.pos < parser.tokens.len() {
        return Err(CalcError::TrailingInput(parser.pos));
    }
    if !value.is_finite() {
        return Err(CalcError::NotFinite);
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorParams {
    pub expression: String,
}

pub struct CalculatorTool {
    name: String,
}

impl CalculatorTool {
    pub fn new() -> Self {
        Self {
            name: "calculator".to_string(),
        }
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression (+, -, *, /, ^, parentheses, scientific notation)"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params: CalculatorParams = args.deserialize()?;
        tokenize(&params.expression)
            .map(|_| ())
            .map_err(|e| ToolError::InvalidArgs {
                message: format!("cannot read expression: {}", e),
            })
    }

    fn execute(&self, args: &ToolArgs) -> Result<ToolResult> {
        let params: CalculatorParams = args.deserialize()?;
        tracing::info!(expression = %params.expression, "Calculating");

        match evaluate(&params.expression) {
            Ok(value) => Ok(ToolResult::success_with_data(
                format!("{} = {}", params.expression, value),
                serde_json::json!({
                    "expression": params.expression,
                    "result": value,
                }),
            )),
            Err(e) => Ok(ToolResult::error(format!(
                "Could not evaluate '{}': {}",
                params.expression, e
            ))),
        }
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The arithmetic expression to evaluate, e.g. 4 * 6.022e23"
                }
            },
            "required": ["expression"]
        })
    }
}
