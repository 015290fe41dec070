//! Grammar for AND/OR expressions.
//!
//! Syntax:
//!   operand                 - any text that is not a reserved token
//!   'quoted' / "quoted"     - quoted text, may contain parens and keywords
//!   expr AND expr           - conjunction
//!   expr OR expr            - disjunction (same precedence as AND)
//!   (expr)                  - grouping
//!
//! Operators are evaluated strictly left to right. The condition syntax
//! additionally splits every operand into `left operator right`.

mod condition;
mod lexer;
mod parser;
mod quote;

pub use condition::Condition;
pub use parser::{Handler, Parser};
pub use quote::{dequote, quote};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GrammarError;

/// Binary operator joining two terms of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinaryOp {
    And,
    Or,
}

impl BinaryOp {
    /// Combine an accumulated value with the next term.
    pub fn apply(self, acc: bool, current: bool) -> bool {
        match self {
            BinaryOp::And => acc && current,
            BinaryOp::Or => acc || current,
        }
    }

    /// Whether `acc` alone already decides the result under this operator.
    pub fn short_circuits(self, acc: bool) -> bool {
        match self {
            BinaryOp::And => !acc,
            BinaryOp::Or => acc,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::And => write!(f, "AND"),
            BinaryOp::Or => write!(f, "OR"),
        }
    }
}

/// Kinds of tokens the parser can be waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Operand,
    OpenParen,
    CloseParen,
    BinaryOperator,
    // Condition syntax
    Left,
    Comparison,
    Right,
}

impl TokenKind {
    const ALL: [TokenKind; 7] = [
        TokenKind::Operand,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::BinaryOperator,
        TokenKind::Left,
        TokenKind::Comparison,
        TokenKind::Right,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    fn label(self) -> &'static str {
        match self {
            TokenKind::Operand => "operand",
            TokenKind::OpenParen => "open paren",
            TokenKind::CloseParen => "close paren",
            TokenKind::BinaryOperator => "binary operator",
            TokenKind::Left => "left operand",
            TokenKind::Comparison => "comparison operator",
            TokenKind::Right => "right operand",
        }
    }
}

/// A set of [`TokenKind`]s, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        KindSet(bits)
    }

    pub fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn with(self, kind: TokenKind) -> Self {
        KindSet(self.0 | kind.bit())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl std::ops::BitOr for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: KindSet) -> KindSet {
        KindSet(self.0 | rhs.0)
    }
}

impl From<TokenKind> for KindSet {
    fn from(kind: TokenKind) -> Self {
        KindSet(kind.bit())
    }
}

/// Renders as `a, b or c`.
impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(TokenKind::label).collect();
        match labels.split_last() {
            None => write!(f, "nothing"),
            Some((last, [])) => write!(f, "{last}"),
            Some((last, rest)) => write!(f, "{} or {}", rest.join(", "), last),
        }
    }
}

/// Operator keywords recognized between terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grammar {
    pub and_keyword: String,
    pub or_keyword: String,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            and_keyword: "AND".to_string(),
            or_keyword: "OR".to_string(),
        }
    }
}

impl Grammar {
    pub fn new(and_keyword: &str, or_keyword: &str) -> Result<Self, GrammarError> {
        let grammar = Self {
            and_keyword: and_keyword.to_string(),
            or_keyword: or_keyword.to_string(),
        };
        grammar.validate()?;
        Ok(grammar)
    }

    /// Check the keywords can be told apart from operands and from each other.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for keyword in [&self.and_keyword, &self.or_keyword] {
            if keyword.is_empty() {
                return Err(GrammarError::EmptyKeyword);
            }
            if keyword
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"'))
            {
                return Err(GrammarError::ReservedCharacter(keyword.clone()));
            }
        }
        if self.and_keyword.eq_ignore_ascii_case(&self.or_keyword) {
            return Err(GrammarError::DuplicateKeyword(self.and_keyword.clone()));
        }
        Ok(())
    }

    pub(crate) fn keyword(&self, op: BinaryOp) -> &str {
        match op {
            BinaryOp::And => &self.and_keyword,
            BinaryOp::Or => &self.or_keyword,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_set_display() {
        let set = KindSet::of(&[TokenKind::Operand]);
        assert_eq!(set.to_string(), "operand");

        let set = KindSet::of(&[TokenKind::BinaryOperator, TokenKind::CloseParen]);
        assert_eq!(set.to_string(), "close paren or binary operator");

        let set = KindSet::of(&[
            TokenKind::Operand,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
        ]);
        assert_eq!(set.to_string(), "operand, open paren or close paren");
    }

    #[test]
    fn test_kind_set_ops() {
        let set = KindSet::from(TokenKind::Left) | KindSet::from(TokenKind::OpenParen);
        assert!(set.contains(TokenKind::Left));
        assert!(!set.contains(TokenKind::Right));
        assert!(set.with(TokenKind::Right).contains(TokenKind::Right));
        assert!(KindSet::EMPTY.is_empty());
    }

    #[test]
    fn test_short_circuit() {
        assert!(BinaryOp::Or.short_circuits(true));
        assert!(!BinaryOp::Or.short_circuits(false));
        assert!(BinaryOp::And.short_circuits(false));
        assert!(!BinaryOp::And.short_circuits(true));
    }

    #[test]
    fn test_grammar_validation() {
        assert!(Grammar::new("&&", "||").is_ok());
        assert_eq!(Grammar::new("", "OR"), Err(GrammarError::EmptyKeyword));
        assert_eq!(
            Grammar::new("and", "AND"),
            Err(GrammarError::DuplicateKeyword("and".into()))
        );
        assert!(matches!(
            Grammar::new("a b", "OR"),
            Err(GrammarError::ReservedCharacter(_))
        ));
    }
}
