/*
 * condition.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Parser for show_when conditions.
 */

//! `show_when` conditions.
//!
//! A condition is a small boolean formula over input values, written in R
//! syntax:
//!
//! ```text
//! region == 'North' & (year >= 2020 | !(wave %in% c(1, 2)))
//! ```
//!
//! It is parsed into a [`Condition`] tree and serialized to JSON, which the
//! client-side runtime evaluates against the current input state:
//!
//! | syntax | JSON |
//! |---|---|
//! | `x == 'a'` | `{"var":"x","op":"eq","val":"a"}` |
//! | `a & b` | `{"op":"and","conditions":[a,b]}` |
//! | `a \| b` | `{"op":"or","conditions":[a,b]}` |
//! | `!(x == 'a')` | `{"var":"x","op":"neq","val":"a"}` |
//! | `!(a & b)` | `{"op":"not","condition":{...}}` |
//!
//! Any operator outside this grammar is rejected with
//! [`CompileError::UnsupportedOperator`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::error::{CompileError, Result};
use crate::markup::quote_attr;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    In,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    fn from_token(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Neq),
            "%in%" => Some(CompareOp::In),
            ">" => Some(CompareOp::Gt),
            "<" => Some(CompareOp::Lt),
            ">=" => Some(CompareOp::Gte),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::In => "in",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
            CompareOp::Gte => "gte",
            CompareOp::Lte => "lte",
        }
    }
}

/// A parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        var: String,
        op: CompareOp,
        val: Value,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Logical negation. Direct `eq`/`neq` comparisons flip their operator.
    pub fn negate(self) -> Self {
        match self {
            Condition::Compare {
                var,
                op: CompareOp::Eq,
                val,
            } => Condition::Compare {
                var,
                op: CompareOp::Neq,
                val,
            },
            Condition::Compare {
                var,
                op: CompareOp::Neq,
                val,
            } => Condition::Compare {
                var,
                op: CompareOp::Eq,
                val,
            },
            Condition::Not(inner) => *inner,
            other => Condition::Not(Box::new(other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Condition::Compare { var, op, val } => json!({
                "var": var,
                "op": op.as_str(),
                "val": val,
            }),
            Condition::And(conditions) => json!({
                "op": "and",
                "conditions": conditions.iter().map(Condition::to_json).collect::<Vec<_>>(),
            }),
            Condition::Or(conditions) => json!({
                "op": "or",
                "conditions": conditions.iter().map(Condition::to_json).collect::<Vec<_>>(),
            }),
            Condition::Not(inner) => json!({
                "op": "not",
                "condition": inner.to_json(),
            }),
        }
    }

    /// Compact JSON text of [`Condition::to_json`].
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Parse a `show_when` expression.
pub fn parse(expr: &str) -> Result<Condition> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
    };
    let condition = parser.parse_or()?;
    match parser.peek() {
        None => Ok(condition),
        Some(tok) => Err(parser.syntax(format!("unexpected {}", tok.describe()))),
    }
}

/// Opening marker of a conditionally visible block.
pub fn show_when_open(condition: &Condition) -> String {
    format!(
        "<div class=\"viz-show-when\" data-show-when={}>",
        quote_attr(&condition.to_json_string())
    )
}

pub const SHOW_WHEN_CLOSE: &str = "</div>";

/// Wrap already-rendered lines in show_when markers. Blank lines around the
/// content let Quarto keep parsing it as markdown.
pub fn wrap_show_when(expr: &str, lines: Vec<String>) -> Result<Vec<String>> {
    let condition = parse(expr)?;
    let mut out = Vec::with_capacity(lines.len() + 4);
    out.push(show_when_open(&condition));
    out.push(String::new());
    out.extend(lines);
    out.push(String::new());
    out.push(SHOW_WHEN_CLOSE.to_string());
    Ok(out)
}

/// Wrap in show_when markers when `expr` is set. The expression is checked
/// even when there is nothing to wrap.
pub fn apply_show_when(expr: Option<&str>, lines: Vec<String>) -> Result<Vec<String>> {
    match expr {
        Some(expr) if lines.is_empty() => {
            parse(expr)?;
            Ok(lines)
        }
        Some(expr) => wrap_show_when(expr, lines),
        None => Ok(lines),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64, bool),
    LParen,
    RParen,
    Comma,
    Op(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Str(s) => format!("string '{}'", s),
            Token::Num(n, _) => format!("number {}", n),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Op(op) => format!("operator '{}'", op),
        }
    }
}

fn unsupported(operator: impl Into<String>, expr: &str) -> CompileError {
    CompileError::UnsupportedOperator {
        operator: operator.into(),
        expr: expr.to_string(),
    }
}

/// One token at the start of the remaining input. Alternatives are tried
/// left to right, so numbers win over names starting with `.`.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)^(?:
            (?P<ws>\s+)
          | (?P<str>'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")
          | (?P<num>(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?L?)
          | (?P<ident>[\p{L}._][\p{L}\p{N}._]*)
          | (?P<quoted>`[^`]*`)
          | (?P<op>%[^%\s]*%|==|!=|>=|<=|&&?|\|\|?|[!<>])
          | (?P<punct>[(),])
        )"#,
    )
    .expect("Invalid regex pattern for condition tokens")
});

/// A negative number literal.
static SIGNED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?L?")
        .expect("Invalid regex pattern for signed numbers")
});

/// Whether a value may start after `prev`, which is where a leading `-`
/// is a sign rather than subtraction.
fn expects_value(prev: Option<&Token>) -> bool {
    match prev {
        Some(Token::Op(op)) => CompareOp::from_token(op).is_some(),
        Some(Token::LParen | Token::Comma) => true,
        _ => false,
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < expr.len() {
        let rest = &expr[pos..];

        if rest.starts_with('-') {
            match SIGNED_NUMBER.find(rest) {
                Some(m) if expects_value(tokens.last()) => {
                    tokens.push(number_token(m.as_str(), expr)?);
                    pos += m.end();
                    continue;
                }
                _ => return Err(unsupported("-", expr)),
            }
        }

        let Some(caps) = TOKEN_PATTERN.captures(rest) else {
            return Err(match rest.chars().next() {
                Some('\'' | '"') => syntax_error(expr, "unterminated string"),
                Some('`') => syntax_error(expr, "unterminated backquoted name"),
                Some('%') => unsupported("%", expr),
                Some(c) => unsupported(c.to_string(), expr),
                None => syntax_error(expr, "unexpected end of input"),
            });
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        pos += whole.end();

        if caps.name("ws").is_some() {
            continue;
        }
        let token = if let Some(m) = caps.name("str") {
            Token::Str(unescape(m.as_str()))
        } else if let Some(m) = caps.name("num") {
            number_token(m.as_str(), expr)?
        } else if let Some(m) = caps.name("ident") {
            Token::Ident(m.as_str().to_string())
        } else if let Some(m) = caps.name("quoted") {
            Token::Ident(m.as_str().trim_matches('`').to_string())
        } else if let Some(m) = caps.name("op") {
            let op = m.as_str();
            if op.starts_with('%') && op != "%in%" {
                return Err(unsupported(op, expr));
            }
            let op = match op {
                "&&" => "&",
                "||" => "|",
                other => other,
            };
            Token::Op(op.to_string())
        } else {
            match whole.as_str() {
                "(" => Token::LParen,
                ")" => Token::RParen,
                _ => Token::Comma,
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn syntax_error(expr: &str, message: &str) -> CompileError {
    CompileError::ConditionSyntax {
        expr: expr.to_string(),
        message: message.to_string(),
    }
}

/// Strip the quotes of a string literal and resolve backslash escapes.
fn unescape(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn number_token(text: &str, expr: &str) -> Result<Token> {
    // R's integer suffix
    let digits = text.strip_suffix('L').unwrap_or(text);
    let value: f64 = digits
        .parse()
        .map_err(|_| syntax_error(expr, &format!("invalid number '{}'", digits)))?;
    let is_int = !digits.contains(['.', 'e', 'E']);
    Ok(Token::Num(value, is_int))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn at_op(&self, op: &str) -> bool {
        matches!(self.peek(), Some(Token::Op(o)) if o == op)
    }

    fn syntax(&self, message: impl Into<String>) -> CompileError {
        CompileError::ConditionSyntax {
            expr: self.expr.to_string(),
            message: message.into(),
        }
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        match self.advance() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(self.syntax(format!(
                "expected {}, found {}",
                want.describe(),
                tok.describe()
            ))),
            None => Err(self.syntax(format!("expected {}, found end of input", want.describe()))),
        }
    }

    fn parse_or(&mut self) -> Result<Condition> {
        let mut terms = vec![self.parse_and()?];
        while self.at_op("|") {
            self.advance();
            terms.push(self.parse_and()?);
        }
        Ok(combine(terms, Condition::Or))
    }

    fn parse_and(&mut self) -> Result<Condition> {
        let mut terms = vec![self.parse_unary()?];
        while self.at_op("&") {
            self.advance();
            terms.push(self.parse_unary()?);
        }
        Ok(combine(terms, Condition::And))
    }

    fn parse_unary(&mut self) -> Result<Condition> {
        if self.at_op("!") {
            self.advance();
            return Ok(self.parse_unary()?.negate());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Condition> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(var)) => {
                let op = match self.peek() {
                    Some(Token::Op(op)) => CompareOp::from_token(op),
                    _ => None,
                };
                match op {
                    Some(op) => {
                        self.advance();
                        let val = self.parse_value()?;
                        Ok(Condition::Compare { var, op, val })
                    }
                    // A bare name tests a logical input.
                    None => Ok(Condition::Compare {
                        var,
                        op: CompareOp::Eq,
                        val: Value::Bool(true),
                    }),
                }
            }
            Some(tok) => Err(self.syntax(format!("unexpected {}", tok.describe()))),
            None => Err(self.syntax("unexpected end of input")),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Value::String(s)),
            Some(Token::Num(n, is_int)) => Ok(number_value(n, is_int)),
            Some(Token::Ident(id)) if id == "TRUE" => Ok(Value::Bool(true)),
            Some(Token::Ident(id)) if id == "FALSE" => Ok(Value::Bool(false)),
            Some(Token::Ident(id)) if id == "c" => {
                self.expect(Token::LParen)?;
                let mut values = Vec::new();
                if matches!(self.peek(), Some(Token::RParen)) {
                    self.advance();
                    return Ok(Value::Array(values));
                }
                loop {
                    values.push(self.parse_value()?);
                    match self.advance() {
                        Some(Token::Comma) => continue,
                        Some(Token::RParen) => break,
                        Some(tok) => {
                            return Err(self.syntax(format!(
                                "expected ',' or ')' in c(...), found {}",
                                tok.describe()
                            )));
                        }
                        None => return Err(self.syntax("unterminated c(...)")),
                    }
                }
                Ok(Value::Array(values))
            }
            Some(tok) => Err(self.syntax(format!("expected a value, found {}", tok.describe()))),
            None => Err(self.syntax("expected a value, found end of input")),
        }
    }
}

fn combine(mut terms: Vec<Condition>, make: fn(Vec<Condition>) -> Condition) -> Condition {
    if terms.len() == 1 {
        return terms.remove(0);
    }
    make(terms)
}

fn number_value(n: f64, is_int: bool) -> Value {
    if is_int && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
