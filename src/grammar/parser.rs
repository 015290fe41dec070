//! Grammar-driven state machine over the lexer.
//!
//! The parser holds no tree. It tracks which token kinds may come next, the
//! group nesting depth and the kind of the last accepted token, and reports
//! structure through [`Handler`] hooks.
//!
//! Transitions (operand syntax; the condition syntax replaces `operand`
//! with `left` -> `comparison` -> `right`):
//!
//! ```text
//! start           -> operand | "("
//! "("             -> operand | "("
//! operator        -> operand | "("
//! operand, ")"    -> operator | ")" (only while depth > 0)
//! ```

use super::condition::Condition;
use super::lexer::{Lexer, Token, skip_whitespace};
use super::quote::dequote;
use super::{BinaryOp, Grammar, KindSet, TokenKind};
use crate::error::{GrammarError, ParseError, ParseResult};

/// Hooks fired while an expression is scanned.
///
/// Every hook has a no-op default so a handler only implements what it
/// needs. [`Handler::error`] receives each grammar error; returning it
/// (the default) makes the parse fail with that error, returning `Ok(())`
/// stops the parse quietly.
pub trait Handler {
    fn open_paren(&mut self) {}

    fn close_paren(&mut self) {}

    fn binary_operator(&mut self, _op: BinaryOp) {}

    /// Operand text of the operand syntax, trailing whitespace trimmed.
    fn operand(&mut self, _text: &str) {}

    /// Completed comparison of the condition syntax.
    fn condition(&mut self, _condition: Condition) {}

    fn error(&mut self, error: ParseError) -> ParseResult<()> {
        Err(error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Operands,
    Conditions,
}

impl Syntax {
    /// Kinds accepted at the start of an expression or group.
    fn start(self) -> KindSet {
        match self {
            Syntax::Operands => KindSet::of(&[TokenKind::Operand, TokenKind::OpenParen]),
            Syntax::Conditions => KindSet::of(&[TokenKind::Left, TokenKind::OpenParen]),
        }
    }

    /// The kind that completes a leaf.
    fn leaf_end(self) -> TokenKind {
        match self {
            Syntax::Operands => TokenKind::Operand,
            Syntax::Conditions => TokenKind::Right,
        }
    }
}

/// Kinds accepted after a completed leaf or a close paren.
fn after_term(depth: usize) -> KindSet {
    let expected = KindSet::from(TokenKind::BinaryOperator);
    if depth > 0 {
        expected.with(TokenKind::CloseParen)
    } else {
        expected
    }
}

/// Expression parser for one set of operator keywords.
///
/// # Example
///
/// ```
/// use boolparse::{Handler, Parser};
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl Handler for Count {
///     fn operand(&mut self, _text: &str) {
///         self.0 += 1;
///     }
/// }
///
/// let mut count = Count::default();
/// Parser::new().parse("a = 1 OR (b = 2 AND c = 3)", &mut count).unwrap();
/// assert_eq!(count.0, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    grammar: Grammar,
}

impl Parser {
    /// A parser for the default `AND`/`OR` keywords.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grammar(grammar: Grammar) -> Result<Self, GrammarError> {
        grammar.validate()?;
        Ok(Self { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Scan `input` in the operand syntax, firing `handler` hooks.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] the handler passes back from
    /// [`Handler::error`].
    pub fn parse<H: Handler + ?Sized>(&self, input: &str, handler: &mut H) -> ParseResult<()> {
        self.run(input, Syntax::Operands, handler)
    }

    /// Scan `input` in the condition syntax (`left operator right` leaves).
    pub fn parse_conditions<H: Handler + ?Sized>(
        &self,
        input: &str,
        handler: &mut H,
    ) -> ParseResult<()> {
        self.run(input, Syntax::Conditions, handler)
    }

    fn run<H: Handler + ?Sized>(
        &self,
        input: &str,
        syntax: Syntax,
        handler: &mut H,
    ) -> ParseResult<()> {
        let lexer = Lexer::new(&self.grammar);
        let mut expected = syntax.start();
        let mut depth = 0usize;
        let mut last: Option<TokenKind> = None;
        let mut pending_left = String::new();
        let mut pending_comparison = "";
        let mut rest = input;

        loop {
            skip_whitespace(&mut rest);
            if rest.is_empty() {
                break;
            }
            let position = input.len() - rest.len();
            let prev = input[..position].chars().next_back();
            let Some(token) = lexer.next_token(expected, prev, &mut rest) else {
                tracing::debug!(position, %expected, "unexpected token");
                return handler.error(ParseError::unexpected(input, position, expected));
            };
            tracing::trace!(?token, position, depth, "accepted token");

            last = Some(token.kind());
            match token {
                Token::OpenParen => {
                    handler.open_paren();
                    depth += 1;
                    expected = syntax.start();
                }
                Token::CloseParen => {
                    handler.close_paren();
                    depth -= 1;
                    expected = after_term(depth);
                }
                Token::BinaryOperator(op) => {
                    handler.binary_operator(op);
                    expected = syntax.start();
                }
                Token::Operand(text) => {
                    handler.operand(text);
                    expected = after_term(depth);
                }
                Token::Left(text) => {
                    pending_left = dequote(text);
                    expected = TokenKind::Comparison.into();
                }
                Token::Comparison(op) => {
                    pending_comparison = op;
                    expected = TokenKind::Right.into();
                }
                Token::Right(text) => {
                    handler.condition(Condition {
                        left: std::mem::take(&mut pending_left),
                        operator: pending_comparison.to_string(),
                        right: dequote(text),
                    });
                    expected = after_term(depth);
                }
            }
        }

        match last {
            None => Ok(()),
            Some(kind) if kind != TokenKind::CloseParen && kind != syntax.leaf_end() => {
                tracing::debug!(%expected, "incomplete expression");
                handler.error(ParseError::IncompleteExpression { expected })
            }
            Some(_) if depth > 0 => {
                tracing::debug!(unclosed = depth, "unbalanced parenthesis");
                handler.error(ParseError::UnbalancedParens { unclosed: depth })
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records hook calls as strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        errors: Vec<String>,
    }

    impl Handler for Recorder {
        fn open_paren(&mut self) {
            self.events.push("(".into());
        }

        fn close_paren(&mut self) {
            self.events.push(")".into());
        }

        fn binary_operator(&mut self, op: BinaryOp) {
            self.events.push(op.to_string());
        }

        fn operand(&mut self, text: &str) {
            self.events.push(format!("<{text}>"));
        }

        fn condition(&mut self, condition: Condition) {
            self.events.push(format!(
                "[{}|{}|{}]",
                condition.left, condition.operator, condition.right
            ));
        }
    }

    fn events(input: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        Parser::new().parse(input, &mut recorder).unwrap();
        recorder.events
    }

    #[test]
    fn test_simple_operand() {
        assert_eq!(events("x = 10"), vec!["<x = 10>"]);
        assert_eq!(events("  x = 10  "), vec!["<x = 10>"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(events("").is_empty());
        assert!(events("   ").is_empty());
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            events("(a OR (b)) and c"),
            vec!["(", "<a>", "OR", "(", "<b>", ")", ")", "AND", "<c>"]
        );
    }

    #[test]
    fn test_conditions() {
        let mut recorder = Recorder::default();
        Parser::new()
            .parse_conditions(
                r#"x = 10 OR (name LIKE "Jo\"e%" AND 'the key' IS NULL)"#,
                &mut recorder,
            )
            .unwrap();
        assert_eq!(
            recorder.events,
            vec![
                "[x|=|10]",
                "OR",
                "(",
                r#"[name|LIKE|Jo"e%]"#,
                "AND",
                "[the key|IS|NULL]",
                ")"
            ]
        );
    }

    #[test]
    fn test_two_operators_in_a_row() {
        let err = Parser::new()
            .parse("a OR AND b", &mut Recorder::default())
            .unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                position, expected, ..
            } => {
                assert_eq!(position, 5);
                assert_eq!(expected, Syntax::Operands.start());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_leading_operator() {
        let err = Parser::new()
            .parse("OR b", &mut Recorder::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { position: 0, .. }));
    }

    #[test]
    fn test_stray_close_paren() {
        let err = Parser::new()
            .parse("a)", &mut Recorder::default())
            .unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, .. } => {
                assert_eq!(expected, KindSet::from(TokenKind::BinaryOperator));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_expression() {
        let err = Parser::new()
            .parse("x = 10 OR", &mut Recorder::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::IncompleteExpression { .. }));
        assert_eq!(
            err.to_string(),
            "incomplete expression, expected operand or open paren"
        );
    }

    #[test]
    fn test_unbalanced_parens() {
        let err = Parser::new()
            .parse("((x = 10)", &mut Recorder::default())
            .unwrap_err();
        assert_eq!(err, ParseError::UnbalancedParens { unclosed: 1 });
    }

    #[test]
    fn test_incomplete_condition() {
        let err = Parser::new()
            .parse_conditions("x =", &mut Recorder::default())
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::IncompleteExpression {
                expected: TokenKind::Right.into()
            }
        );
    }

    #[test]
    fn test_error_sink_stops_quietly() {
        struct Sink(Recorder);

        impl Handler for Sink {
            fn operand(&mut self, text: &str) {
                self.0.operand(text);
            }

            fn error(&mut self, error: ParseError) -> ParseResult<()> {
                self.0.errors.push(error.to_string());
                Ok(())
            }
        }

        let mut sink = Sink(Recorder::default());
        assert!(Parser::new().parse("a OR OR b", &mut sink).is_ok());
        assert_eq!(sink.0.events, vec!["<a>"]);
        assert_eq!(sink.0.errors.len(), 1);
        assert!(sink.0.errors[0].contains("a OR >>>OR b"));
    }

    #[test]
    fn test_custom_keywords() {
        let parser = Parser::with_grammar(Grammar::new("&&", "||").unwrap()).unwrap();
        let mut recorder = Recorder::default();
        parser.parse("a && (b || c) &&d", &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["<a>", "AND", "(", "<b>", "OR", "<c>", ")", "AND", "<d>"]
        );

        let mut recorder = Recorder::default();
        parser.parse("x AND y", &mut recorder).unwrap();
        assert_eq!(recorder.events, vec!["<x AND y>"]);
    }
}
