//! The token grammar: one rule per [`TokenKind`], in match priority order.
//!
//! The same table drives lexing (the `pattern` column, first match wins) and
//! the later stages (precedence and the semantic action of each kind).

use crate::error::Error;
use crate::runtime::arithmetic;
use crate::types::Value;
use num_complex::Complex64;
use regex::Regex;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Float,
    Complex,
    Integer,
    LParent,
    RParent,
    Plus,
    Minus,
    Power,
    Times,
    FDivide,
    Divide,
    Comma,
    Modulo,
    Equals,
    Le,
    Lt,
    Ge,
    Gt,
    Ne,
    Space,
    Func,
    Const,
    Args,
    UMinus,
    UPlus,
}

/// What a token of a given kind means once the expression is evaluated.
#[derive(Clone, Copy)]
pub enum Action {
    /// Converts the literal text into a number.
    Literal(fn(&str) -> Result<Value, Error>),
    /// Looked up through the resolver (functions and constants).
    Resolve,
    /// Structural only: parentheses and commas.
    Marker,
    /// Argument-count marker carrying `true`/`false` as text.
    Flag,
    Unary(fn(Value) -> Result<Value, Error>),
    Binary(fn(Value, Value) -> Result<Value, Error>),
    /// Matched and thrown away.
    Skip,
}

pub struct GrammarRule {
    pub kind: TokenKind,
    /// `None` for the synthetic kinds the lexer never produces directly.
    pub pattern: Option<Regex>,
    pub action: Action,
    /// Lower binds looser; `None` for whitespace.
    pub precedence: Option<u8>,
}

impl GrammarRule {
    fn new(kind: TokenKind, pattern: Option<&str>, action: Action, precedence: Option<u8>) -> Self {
        let pattern = pattern.map(|p| {
            Regex::new(&format!("^(?:{})", p)).expect("grammar patterns are valid regexes")
        });
        Self { kind, pattern, action, precedence }
    }

    /// Length of the prefix of `input` this rule matches, if any.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.pattern
            .as_ref()
            .and_then(|re| re.find(input))
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

lazy_static::lazy_static! {
    static ref GRAMMAR: Vec<GrammarRule> = {
        use Action::*;
        use TokenKind as K;
        vec![
            GrammarRule::new(K::Float, Some(r"[0-9]*\.[0-9]+"), Literal(parse_float), Some(9)),
            GrammarRule::new(K::Complex, Some(r"[0-9]+[jJ]\b"), Literal(parse_imaginary), Some(9)),
            GrammarRule::new(K::Integer, Some(r"[0-9]+"), Literal(parse_integer), Some(9)),
            GrammarRule::new(K::LParent, Some(r"\("), Marker, Some(0)),
            GrammarRule::new(K::RParent, Some(r"\)"), Marker, Some(0)),
            GrammarRule::new(K::Plus, Some(r"\+"), Binary(arithmetic::add), Some(4)),
            GrammarRule::new(K::Minus, Some(r"-"), Binary(arithmetic::sub), Some(4)),
            GrammarRule::new(K::Power, Some(r"\^|\*\*"), Binary(arithmetic::pow), Some(7)),
            GrammarRule::new(K::Times, Some(r"\*"), Binary(arithmetic::mul), Some(5)),
            GrammarRule::new(K::FDivide, Some(r"//"), Binary(arithmetic::floor_div), Some(5)),
            GrammarRule::new(K::Divide, Some(r"/"), Binary(arithmetic::true_div), Some(5)),
            GrammarRule::new(K::Comma, Some(r","), Marker, Some(8)),
            GrammarRule::new(K::Modulo, Some(r"%"), Binary(arithmetic::modulo), Some(5)),
            GrammarRule::new(K::Equals, Some(r"=="), Binary(arithmetic::eq), Some(2)),
            GrammarRule::new(K::Le, Some(r"<="), Binary(arithmetic::le), Some(3)),
            GrammarRule::new(K::Lt, Some(r"<"), Binary(arithmetic::lt), Some(3)),
            GrammarRule::new(K::Ge, Some(r">="), Binary(arithmetic::ge), Some(3)),
            GrammarRule::new(K::Gt, Some(r">"), Binary(arithmetic::gt), Some(3)),
            GrammarRule::new(K::Ne, Some(r"!="), Binary(arithmetic::ne), Some(2)),
            GrammarRule::new(K::Space, Some(r"\s+"), Skip, None),
            GrammarRule::new(K::Func, Some(r"\w+(?:\.\w+)*\("), Resolve, Some(1)),
            GrammarRule::new(K::Const, Some(r"\w+(?:\.\w+)*"), Resolve, Some(9)),
            GrammarRule::new(K::Args, None, Flag, Some(1)),
            GrammarRule::new(K::UMinus, None, Unary(arithmetic::neg), Some(6)),
            GrammarRule::new(K::UPlus, None, Unary(arithmetic::pos), Some(6)),
        ]
    };
}

/// All rules in match priority order.
pub fn rules() -> &'static [GrammarRule] {
    &GRAMMAR
}

impl TokenKind {
    pub fn rule(self) -> &'static GrammarRule {
        &GRAMMAR[self as usize]
    }

    pub fn precedence(self) -> u8 {
        self.rule().precedence.unwrap_or(0)
    }

    pub fn action(self) -> Action {
        self.rule().action
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Float => "FLOAT",
            TokenKind::Complex => "COMPLEX",
            TokenKind::Integer => "INTEGER",
            TokenKind::LParent => "LPARENT",
            TokenKind::RParent => "RPARENT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Power => "POWER",
            TokenKind::Times => "TIMES",
            TokenKind::FDivide => "FDIVIDE",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Comma => "COMMA",
            TokenKind::Modulo => "MODULO",
            TokenKind::Equals => "EQUALS",
            TokenKind::Le => "LE",
            TokenKind::Lt => "LT",
            TokenKind::Ge => "GE",
            TokenKind::Gt => "GT",
            TokenKind::Ne => "NE",
            TokenKind::Space => "SPACE",
            TokenKind::Func => "FUNC",
            TokenKind::Const => "CONST",
            TokenKind::Args => "ARGS",
            TokenKind::UMinus => "UMINUS",
            TokenKind::UPlus => "UPLUS",
        }
    }

    /// Kinds that stand for a value on their own.
    pub fn is_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Float | TokenKind::Integer | TokenKind::Complex | TokenKind::Const
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(self, TokenKind::UMinus | TokenKind::UPlus)
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, TokenKind::Power | TokenKind::UMinus | TokenKind::UPlus)
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

fn parse_float(text: &str) -> Result<Value, Error> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| Error::type_error(format!("invalid float literal: {}", text)))
}

// Integers beyond i64 degrade to floats rather than failing.
fn parse_integer(text: &str) -> Result<Value, Error> {
    match text.parse::<i64>() {
        Ok(i) => Ok(Value::Int(i)),
        Err(_) => parse_float(text),
    }
}

fn parse_imaginary(text: &str) -> Result<Value, Error> {
    let digits = text.trim_end_matches(['j', 'J']);
    digits
        .parse::<f64>()
        .map(|im| Value::Complex(Complex64::new(0.0, im)))
        .map_err(|_| Error::type_error(format!("invalid complex literal: {}", text)))
}
