//! Builds a [`Tree`] from parser hooks.

use super::{Element, Group, Tree};
use crate::error::{ParseError, ParseResult};
use crate::grammar::{BinaryOp, Condition, Handler, Parser};

/// Leaf construction and error handling for a tree parse.
///
/// `L` is the raw leaf the parser produces (`String` for the operand syntax,
/// [`Condition`] for the condition syntax) and `T` the leaf stored in the
/// tree.
pub struct TreeOptions<'a, L, T> {
    on_leaf: Box<dyn FnMut(L) -> T + 'a>,
    on_error: Option<Box<dyn FnMut(&ParseError) + 'a>>,
}

impl<'a, L, T> TreeOptions<'a, L, T> {
    pub fn new(on_leaf: impl FnMut(L) -> T + 'a) -> Self {
        Self {
            on_leaf: Box::new(on_leaf),
            on_error: None,
        }
    }

    /// Report grammar errors to `sink` instead of failing the parse. The
    /// partial tree is then discarded and an empty tree returned.
    pub fn on_error(mut self, sink: impl FnMut(&ParseError) + 'a) -> Self {
        self.on_error = Some(Box::new(sink));
        self
    }
}

impl<'a, L: 'a> Default for TreeOptions<'a, L, L> {
    fn default() -> Self {
        Self::new(|leaf| leaf)
    }
}

/// Parser handler holding the group under construction and its ancestors.
pub(crate) struct TreeBuilder<'a, L, T> {
    current: Group<T>,
    ancestors: Vec<Group<T>>,
    options: TreeOptions<'a, L, T>,
    failed: bool,
}

impl<'a, L, T> TreeBuilder<'a, L, T> {
    pub(crate) fn new(options: TreeOptions<'a, L, T>) -> Self {
        Self {
            current: Group::new(),
            ancestors: Vec::new(),
            options,
            failed: false,
        }
    }

    fn push_leaf(&mut self, raw: L) {
        let leaf = (self.options.on_leaf)(raw);
        self.current.push(Element::Leaf(leaf));
    }

    fn open_group(&mut self) {
        let parent = std::mem::take(&mut self.current);
        self.ancestors.push(parent);
    }

    fn close_group(&mut self) {
        if let Some(parent) = self.ancestors.pop() {
            let group = std::mem::replace(&mut self.current, parent);
            self.current.push(Element::Group(group));
        }
    }

    fn push_operator(&mut self, op: BinaryOp) {
        self.current.push(Element::Operator(op));
    }

    fn report(&mut self, error: ParseError) -> ParseResult<()> {
        match self.options.on_error.as_mut() {
            Some(sink) => {
                sink(&error);
                self.failed = true;
                Ok(())
            }
            None => Err(error),
        }
    }

    pub(crate) fn finish(self) -> Tree<T> {
        if self.failed {
            return Tree::new();
        }
        self.ancestors.into_iter().next().unwrap_or(self.current)
    }
}

impl<T> Handler for TreeBuilder<'_, String, T> {
    fn open_paren(&mut self) {
        self.open_group();
    }

    fn close_paren(&mut self) {
        self.close_group();
    }

    fn binary_operator(&mut self, op: BinaryOp) {
        self.push_operator(op);
    }

    fn operand(&mut self, text: &str) {
        self.push_leaf(text.to_string());
    }

    fn error(&mut self, error: ParseError) -> ParseResult<()> {
        self.report(error)
    }
}

impl<T> Handler for TreeBuilder<'_, Condition, T> {
    fn open_paren(&mut self) {
        self.open_group();
    }

    fn close_paren(&mut self) {
        self.close_group();
    }

    fn binary_operator(&mut self, op: BinaryOp) {
        self.push_operator(op);
    }

    fn condition(&mut self, condition: Condition) {
        self.push_leaf(condition);
    }

    fn error(&mut self, error: ParseError) -> ParseResult<()> {
        self.report(error)
    }
}

impl Parser {
    /// Parse `input` in the operand syntax into a tree of operand strings.
    ///
    /// # Example
    ///
    /// ```
    /// use boolparse::Parser;
    ///
    /// let tree = Parser::new().to_tree("(x = 10) OR y = 2").unwrap();
    /// assert_eq!(tree.len(), 3);
    /// ```
    pub fn to_tree(&self, input: &str) -> ParseResult<Tree<String>> {
        self.to_tree_with(input, TreeOptions::default())
    }

    /// Parse `input` in the operand syntax, building leaves with `options`.
    pub fn to_tree_with<T>(
        &self,
        input: &str,
        options: TreeOptions<'_, String, T>,
    ) -> ParseResult<Tree<T>> {
        let mut builder = TreeBuilder::new(options);
        self.parse(input, &mut builder)?;
        Ok(builder.finish())
    }

    /// Parse `input` in the condition syntax into a tree of [`Condition`]s.
    pub fn to_condition_tree(&self, input: &str) -> ParseResult<Tree<Condition>> {
        self.to_condition_tree_with(input, TreeOptions::default())
    }

    /// Parse `input` in the condition syntax, building leaves with `options`.
    pub fn to_condition_tree_with<T>(
        &self,
        input: &str,
        options: TreeOptions<'_, Condition, T>,
    ) -> ParseResult<Tree<T>> {
        let mut builder = TreeBuilder::new(options);
        self.parse_conditions(input, &mut builder)?;
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> Element<String> {
        Element::Leaf(text.to_string())
    }

    fn group(elements: Vec<Element<String>>) -> Element<String> {
        Element::Group(Group::from_elements(elements))
    }

    #[test]
    fn test_single_leaf() {
        let tree = Parser::new().to_tree("x = 10").unwrap();
        assert_eq!(tree.elements(), &[leaf("x = 10")]);
    }

    #[test]
    fn test_empty_input() {
        let tree = Parser::new().to_tree("").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_group_wraps_leaf() {
        let tree = Parser::new().to_tree("(x = 10)").unwrap();
        assert_eq!(tree.elements(), &[group(vec![leaf("x = 10")])]);
    }

    #[test]
    fn test_composition() {
        let tree = Parser::new().to_tree("(x = 10) OR y = \"Y\"").unwrap();
        assert_eq!(
            tree.elements(),
            &[
                group(vec![leaf("x = 10")]),
                Element::Operator(BinaryOp::Or),
                leaf("y = \"Y\""),
            ]
        );
    }

    #[test]
    fn test_deep_nesting() {
        let tree = Parser::new().to_tree("((a) AND (b OR c))").unwrap();
        assert_eq!(
            tree.elements(),
            &[group(vec![
                group(vec![leaf("a")]),
                Element::Operator(BinaryOp::And),
                group(vec![leaf("b"), Element::Operator(BinaryOp::Or), leaf("c")]),
            ])]
        );
    }

    #[test]
    fn test_custom_leaf_hook() {
        let options = TreeOptions::new(|text: String| text.len());
        let tree = Parser::new().to_tree_with("abc OR de", options).unwrap();
        assert_eq!(tree.leaves(), vec![&3, &2]);
    }

    #[test]
    fn test_error_without_sink_fails() {
        let err = Parser::new().to_tree("(x = 10").unwrap_err();
        assert_eq!(err, ParseError::UnbalancedParens { unclosed: 1 });
    }

    #[test]
    fn test_error_sink_discards_tree() {
        let mut messages = Vec::new();
        let options = TreeOptions::default().on_error(|err| messages.push(err.to_string()));
        let tree = Parser::new().to_tree_with("a OR (b", options).unwrap();
        assert!(tree.is_empty());
        assert_eq!(messages, vec!["1 unclosed parenthesis".to_string()]);
    }

    #[test]
    fn test_condition_tree() {
        let tree = Parser::new()
            .to_condition_tree("x = 10 AND (name != 'Bob')")
            .unwrap();
        assert_eq!(
            tree.elements(),
            &[
                Element::Leaf(Condition::new("x", "=", "10")),
                Element::Operator(BinaryOp::And),
                Element::Group(Group::from_elements(vec![Element::Leaf(Condition::new(
                    "name", "!=", "Bob"
                ))])),
            ]
        );
    }
}
