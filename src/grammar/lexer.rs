//! Token recognizers for the expression grammar.
//!
//! The lexer never runs ahead on its own: the parser asks for the next token
//! among the kinds it currently accepts, and the lexer tries them in priority
//! order (binary operator, open paren, close paren, then operand kinds).

use winnow::ascii::Caseless;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::{BinaryOp, Grammar, KindSet, TokenKind};

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, ErrMode<ContextError>>;

fn backtrack<T>() -> PResult<T> {
    Err(ErrMode::Backtrack(ContextError::default()))
}

/// A recognized token, borrowing its text from the input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'i> {
    OpenParen,
    CloseParen,
    BinaryOperator(BinaryOp),
    /// Operand text with trailing whitespace trimmed.
    Operand(&'i str),
    /// Raw left operand of a condition, quotes included.
    Left(&'i str),
    /// Canonical comparison operator.
    Comparison(&'static str),
    /// Raw right operand of a condition, quotes included.
    Right(&'i str),
}

impl Token<'_> {
    pub(crate) fn kind(&self) -> TokenKind {
        match self {
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
            Token::BinaryOperator(_) => TokenKind::BinaryOperator,
            Token::Operand(_) => TokenKind::Operand,
            Token::Left(_) => TokenKind::Left,
            Token::Comparison(_) => TokenKind::Comparison,
            Token::Right(_) => TokenKind::Right,
        }
    }
}

/// Comparison operators of the condition syntax, longest match first.
const COMPARISONS: [&str; 15] = [
    "!=",
    "<>",
    ">=",
    "<=",
    "=",
    "<",
    ">",
    "NOT LIKE",
    "LIKE",
    "IS NOT",
    "IS",
    "NOT MATCHES",
    "MATCHES",
    "STARTSWITH",
    "ENDSWITH",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '{' | '}' | '-')
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Skip leading whitespace.
pub(crate) fn skip_whitespace(input: &mut &str) {
    let _: PResult<&str> = take_while(0.., char::is_whitespace).parse_next(input);
}

/// Lex a quoted segment, delimiters included. A backslash escapes the next
/// character, so `'it\'s'` is a single segment.
fn quoted<'i>(input: &mut &'i str) -> PResult<&'i str> {
    let start = *input;
    let mut rest = start;
    let delimiter = one_of(is_quote).parse_next(&mut rest)?;
    loop {
        match any.parse_next(&mut rest)? {
            '\\' => {
                any.parse_next(&mut rest)?;
            }
            c if c == delimiter => break,
            _ => {}
        }
    }
    *input = rest;
    Ok(&start[..start.len() - rest.len()])
}

fn open_paren(input: &mut &str) -> PResult<()> {
    '('.void().parse_next(input)
}

fn close_paren(input: &mut &str) -> PResult<()> {
    ')'.void().parse_next(input)
}

/// Lex a comparison operator made of one or more space-separated words.
fn comparison_words(op: &str, input: &mut &str) -> PResult<()> {
    for (i, word) in op.split(' ').enumerate() {
        if i > 0 {
            take_while(1.., char::is_whitespace).parse_next(input)?;
        }
        Caseless(word).parse_next(input)?;
    }
    let alphabetic = op.ends_with(|c: char| c.is_ascii_alphabetic());
    if alphabetic && input.starts_with(is_word_char) {
        return backtrack();
    }
    Ok(())
}

fn comparison(input: &mut &str) -> PResult<&'static str> {
    for op in COMPARISONS {
        let mut probe = *input;
        if comparison_words(op, &mut probe).is_ok() {
            *input = probe;
            return Ok(op);
        }
    }
    backtrack()
}

fn left_operand<'i>(input: &mut &'i str) -> PResult<&'i str> {
    let mut rest = *input;
    let text = alt((quoted, take_while(1.., is_field_char))).parse_next(&mut rest)?;
    *input = rest;
    Ok(text)
}

fn right_operand<'i>(input: &mut &'i str) -> PResult<&'i str> {
    let mut rest = *input;
    let text = alt((
        quoted,
        take_while(1.., |c: char| {
            !c.is_whitespace() && !matches!(c, '(' | ')') && !is_quote(c)
        }),
    ))
    .parse_next(&mut rest)?;
    *input = rest;
    Ok(text)
}

/// Recognizers bound to one set of operator keywords.
pub(crate) struct Lexer<'g> {
    /// Keywords paired with their operator, longest keyword first.
    keywords: [(&'g str, BinaryOp); 2],
}

impl<'g> Lexer<'g> {
    pub(crate) fn new(grammar: &'g Grammar) -> Self {
        let mut keywords = [
            (grammar.keyword(BinaryOp::And), BinaryOp::And),
            (grammar.keyword(BinaryOp::Or), BinaryOp::Or),
        ];
        keywords.sort_by_key(|(keyword, _)| std::cmp::Reverse(keyword.len()));
        Self { keywords }
    }

    /// Lex the next token of a kind in `expected`, or `None` if none matches.
    ///
    /// `prev` is the character just before `input` in the whole expression,
    /// needed to enforce the leading word boundary of operator keywords.
    pub(crate) fn next_token<'i>(
        &self,
        expected: KindSet,
        prev: Option<char>,
        input: &mut &'i str,
    ) -> Option<Token<'i>> {
        for kind in expected.iter_by_priority() {
            let mut rest = *input;
            let token = match kind {
                TokenKind::BinaryOperator => self
                    .binary_operator(prev, &mut rest)
                    .map(Token::BinaryOperator),
                TokenKind::OpenParen => open_paren(&mut rest).map(|_| Token::OpenParen),
                TokenKind::CloseParen => close_paren(&mut rest).map(|_| Token::CloseParen),
                TokenKind::Operand => self.operand(prev, &mut rest).map(Token::Operand),
                TokenKind::Left => left_operand(&mut rest).map(Token::Left),
                TokenKind::Comparison => comparison(&mut rest).map(Token::Comparison),
                TokenKind::Right => right_operand(&mut rest).map(Token::Right),
            };
            if let Ok(token) = token {
                *input = rest;
                return Some(token);
            }
        }
        None
    }

    /// Lex an AND/OR keyword, case-insensitively and as a whole word.
    fn binary_operator(&self, prev: Option<char>, input: &mut &str) -> PResult<BinaryOp> {
        for (keyword, op) in self.keywords {
            let mut probe = *input;
            let matched: PResult<&str> = Caseless(keyword).parse_next(&mut probe);
            if matched.is_err() {
                continue;
            }
            // `recORd` and `ORheading` are operand text, not operators.
            if keyword.starts_with(is_word_char) && prev.is_some_and(is_word_char) {
                continue;
            }
            if keyword.ends_with(is_word_char) && probe.starts_with(is_word_char) {
                continue;
            }
            *input = probe;
            return Ok(op);
        }
        backtrack()
    }

    /// Lex plain operand text up to the next paren, quote or operator keyword.
    fn plain_segment<'i>(&self, prev: Option<char>, input: &mut &'i str) -> PResult<&'i str> {
        let start = *input;
        let mut rest = start;
        let mut last = prev;
        while let Some(c) = rest.chars().next() {
            if matches!(c, '(' | ')') || is_quote(c) {
                break;
            }
            let mut probe = rest;
            if self.binary_operator(last, &mut probe).is_ok() {
                break;
            }
            last = Some(c);
            rest = &rest[c.len_utf8()..];
        }
        if rest.len() == start.len() {
            return backtrack();
        }
        *input = rest;
        Ok(&start[..start.len() - rest.len()])
    }

    /// Lex an operand: alternating plain and quoted segments, trailing
    /// whitespace trimmed.
    fn operand<'i>(&self, prev: Option<char>, input: &mut &'i str) -> PResult<&'i str> {
        let start = *input;
        let mut rest = start;
        let mut last = prev;
        loop {
            let mut probe = rest;
            let segment = match quoted(&mut probe) {
                Ok(segment) => segment,
                Err(_) => match self.plain_segment(last, &mut probe) {
                    Ok(segment) => segment,
                    Err(_) => break,
                },
            };
            last = segment.chars().next_back();
            rest = probe;
        }
        if rest.len() == start.len() {
            return backtrack();
        }
        *input = rest;
        Ok(start[..start.len() - rest.len()].trim_end())
    }
}

impl KindSet {
    /// Kinds in the order the lexer tries them.
    fn iter_by_priority(self) -> impl Iterator<Item = TokenKind> {
        [
            TokenKind::BinaryOperator,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::Operand,
            TokenKind::Left,
            TokenKind::Comparison,
            TokenKind::Right,
        ]
        .into_iter()
        .filter(move |kind| self.contains(*kind))
    }
}
