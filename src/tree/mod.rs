//! Tree model for parsed expressions.
//!
//! A parse produces a [`Tree`]: a top-level [`Group`] whose elements
//! alternate between terms (leaves or nested groups) and binary operators.
//! There is no precedence; a group is read strictly left to right.
//!
//! ```text
//! (x = 10) OR y = "Y"   =>   [[x = 10], OR, y = "Y"]
//! ```

mod builder;
mod filter;
mod solve;


pub use builder::TreeOptions;
pub use filter::filter;
pub use solve::{fsolve, solve};

pub(crate) use builder::TreeBuilder;

use serde::Serialize;
use std::fmt;

use crate::grammar::BinaryOp;

/// One element of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Element<T> {
    Leaf(T),
    Group(Group<T>),
    Operator(BinaryOp),
}

impl<T> Element<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Element::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group<T>> {
        match self {
            Element::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<BinaryOp> {
        match self {
            Element::Operator(op) => Some(*op),
            _ => None,
        }
    }
}

/// An ordered sequence of terms joined by binary operators.
///
/// A well-formed group never starts or ends with an operator and never holds
/// two operators in a row. An empty group is what a fully filtered-out
/// expression leaves behind; a single-element group means the same as its
/// element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Group<T> {
    elements: Vec<Element<T>>,
}

/// The top-level group returned by a parse.
pub type Tree<T> = Group<T>;

impl<T> Default for Group<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T> Group<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_elements(elements: Vec<Element<T>>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element<T>] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element<T>> {
        self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<T>> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn push(&mut self, element: Element<T>) {
        self.elements.push(element);
    }

    /// All leaves, depth first, left to right.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        for element in &self.elements {
            match element {
                Element::Leaf(leaf) => out.push(leaf),
                Element::Group(group) => group.collect_leaves(out),
                Element::Operator(_) => {}
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a Group<T> {
    type Item = &'a Element<T>;
    type IntoIter = std::slice::Iter<'a, Element<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Renders back to expression text: nested groups in parens, operators as
/// `AND`/`OR`, leaves through their own `Display`.
impl<T: fmt::Display> fmt::Display for Group<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match element {
                Element::Leaf(leaf) => write!(f, "{leaf}")?,
                Element::Group(group) => write!(f, "({group})")?,
                Element::Operator(op) => write!(f, "{op}")?,
            }
        }
        Ok(())
    }
}
