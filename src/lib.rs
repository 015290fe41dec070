//! Parse AND/OR boolean expressions into trees, then filter, solve or
//! partially solve them.
//!
//! ```
//! use boolparse::{solve, to_tree};
//!
//! let tree = to_tree("(status = open) OR owner = me").unwrap();
//! assert_eq!(tree.to_string(), "(status = open) OR owner = me");
//! assert!(solve(&tree, |leaf| leaf == "owner = me"));
//! ```

pub mod error;
pub mod facts;
pub mod grammar;
pub mod tree;

pub use error::{GrammarError, ParseError, ParseResult};
pub use facts::Facts;
pub use grammar::{
    BinaryOp, Condition, Grammar, Handler, KindSet, Parser, TokenKind, dequote, quote,
};
pub use tree::{Element, Group, Tree, TreeOptions, filter, fsolve, solve};

/// Parse `input` with the default `AND`/`OR` grammar into a tree of operand
/// strings.
pub fn to_tree(input: &str) -> ParseResult<Tree<String>> {
    Parser::new().to_tree(input)
}

/// Parse `input` with the default grammar in the condition syntax.
pub fn to_condition_tree(input: &str) -> ParseResult<Tree<Condition>> {
    Parser::new().to_condition_tree(input)
}
