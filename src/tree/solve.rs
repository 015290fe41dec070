//! Evaluating a tree against a leaf predicate.
//!
//! Both evaluators read a group left to right with no precedence, starting
//! from an implicit `OR`. Once the value so far decides the result under the
//! next operator (`true OR ...`, `false AND ...`), the term after that
//! operator is skipped without calling the predicate.

use super::{Element, Group, Tree};
use crate::grammar::BinaryOp;

/// Evaluate `tree` to a boolean. An empty tree is `false`.
///
/// # Example
///
/// ```
/// use boolparse::{solve, to_tree};
///
/// let tree = to_tree("a AND (b OR c)").unwrap();
/// assert!(solve(&tree, |leaf| leaf != "b"));
/// assert!(!solve(&tree, |leaf| leaf == "b"));
/// ```
pub fn solve<T>(tree: &Tree<T>, mut predicate: impl FnMut(&T) -> bool) -> bool {
    let result = solve_group(tree, &mut predicate);
    tracing::trace!(result, "solved expression tree");
    result
}

fn solve_group<T, P>(group: &Group<T>, predicate: &mut P) -> bool
where
    P: FnMut(&T) -> bool,
{
    let mut acc = false;
    let mut op = BinaryOp::Or;
    let mut skip = 0usize;

    for element in group {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        let current = match element {
            Element::Operator(next) => {
                op = *next;
                if op.short_circuits(acc) {
                    skip = 1;
                }
                continue;
            }
            Element::Leaf(leaf) => predicate(leaf),
            Element::Group(sub) => solve_group(sub, predicate),
        };
        acc = op.apply(acc, current);
    }
    acc
}

/// Evaluate `tree` with a tri-state predicate, where `None` marks a leaf as
/// filtered out.
///
/// Filtered-out terms contribute nothing: the value is decided by the
/// remaining terms only, and is `None` when every leaf was filtered out.
///
/// # Example
///
/// ```
/// use boolparse::{fsolve, to_tree};
///
/// let tree = to_tree("a AND b").unwrap();
/// assert_eq!(fsolve(&tree, |leaf| (leaf == "b").then_some(true)), Some(true));
/// assert_eq!(fsolve(&tree, |_| None), None);
/// ```
pub fn fsolve<T>(tree: &Tree<T>, mut predicate: impl FnMut(&T) -> Option<bool>) -> Option<bool> {
    let result = fsolve_group(tree, &mut predicate);
    tracing::trace!(?result, "solved filtered expression tree");
    result
}

fn fsolve_group<T, P>(group: &Group<T>, predicate: &mut P) -> Option<bool>
where
    P: FnMut(&T) -> Option<bool>,
{
    let mut acc: Option<bool> = None;
    let mut op = BinaryOp::Or;
    let mut skip = 0usize;

    for element in group {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        let current = match element {
            Element::Operator(next) => {
                op = *next;
                if op.short_circuits(acc.unwrap_or(false)) {
                    skip = 1;
                }
                continue;
            }
            Element::Leaf(leaf) => predicate(leaf),
            Element::Group(sub) => fsolve_group(sub, predicate),
        };
        match current {
            Some(value) => acc = Some(op.apply(acc.unwrap_or(false), value)),
            // Nothing on the left yet: the operator after this term has
            // nothing to join, so it goes too.
            None if acc.is_none() => skip = 1,
            None => {}
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Parser;
    use std::collections::HashMap;

    fn parse(input: &str) -> Tree<String> {
        Parser::new().to_tree(input).unwrap()
    }

    /// Predicate over a fixed truth table that records every call.
    fn table<'a>(
        values: &'a [(&'a str, bool)],
        calls: &'a mut Vec<String>,
    ) -> impl FnMut(&String) -> bool + 'a {
        let values: HashMap<&str, bool> = values.iter().copied().collect();
        move |leaf: &String| {
            calls.push(leaf.clone());
            values.get(leaf.as_str()).copied().unwrap_or(false)
        }
    }

    #[test]
    fn test_empty_tree_is_false() {
        assert!(!solve(&parse(""), |_| true));
        assert_eq!(fsolve(&parse(""), |_| Some(true)), None);
    }

    #[test]
    fn test_or_skips_term_after_true() {
        let tree = parse("a OR b AND c");
        let mut calls = Vec::new();
        let result = solve(
            &tree,
            table(&[("a", true), ("b", false), ("c", true)], &mut calls),
        );
        assert!(result);
        assert_eq!(calls, vec!["a", "c"]);
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        // (a OR b) AND c, not a OR (b AND c)
        let tree = parse("a OR b AND c");
        let mut calls = Vec::new();
        let result = solve(
            &tree,
            table(&[("a", true), ("b", true), ("c", false)], &mut calls),
        );
        assert!(!result);
    }

    #[test]
    fn test_and_skips_term_after_false() {
        let tree = parse("a AND (b OR c) OR d");
        let mut calls = Vec::new();
        let result = solve(&tree, table(&[("a", false), ("d", true)], &mut calls));
        assert!(result);
        assert_eq!(calls, vec!["a", "d"]);
    }

    #[test]
    fn test_nested_group() {
        let tree = parse("a AND (b OR c)");
        let mut calls = Vec::new();
        let result = solve(
            &tree,
            table(&[("a", true), ("b", false), ("c", true)], &mut calls),
        );
        assert!(result);
        assert_eq!(calls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fsolve_absent_left_of_and() {
        let tree = parse("a AND b");
        let result = fsolve(&tree, |leaf| match leaf.as_str() {
            "a" => None,
            _ => Some(true),
        });
        assert_eq!(result, Some(true));
    }

    #[test]
    fn test_fsolve_all_absent() {
        let tree = parse("a AND (b OR c) OR d");
        assert_eq!(fsolve(&tree, |_| None), None);
    }

    #[test]
    fn test_fsolve_absent_after_value_keeps_operator() {
        // b is filtered out after a decided a value, so the AND still joins
        // that value to c and short-circuits it.
        let tree = parse("a OR b AND c");
        let mut calls = Vec::new();
        let result = fsolve(&tree, |leaf| {
            calls.push(leaf.clone());
            match leaf.as_str() {
                "a" => Some(false),
                "b" => None,
                _ => Some(true),
            }
        });
        assert_eq!(result, Some(false));
        assert_eq!(calls, vec!["a", "b"]);
    }

    #[test]
    fn test_fsolve_absent_group() {
        let tree = parse("(a OR b) AND c");
        let result = fsolve(&tree, |leaf| match leaf.as_str() {
            "c" => Some(false),
            _ => None,
        });
        assert_eq!(result, Some(false));
    }

    #[test]
    fn test_fsolve_short_circuit() {
        let tree = parse("a OR b");
        let mut calls = 0;
        let result = fsolve(&tree, |_| {
            calls += 1;
            Some(true)
        });
        assert_eq!(result, Some(true));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_fsolve_matches_solve_without_absent() {
        let tree = parse("a AND (b OR c) OR (d AND e)");
        let truth: HashMap<&str, bool> =
            [("a", true), ("b", false), ("c", true), ("d", false), ("e", true)].into();
        let expected = solve(&tree, |leaf| truth[leaf.as_str()]);
        let actual = fsolve(&tree, |leaf| Some(truth[leaf.as_str()]));
        assert_eq!(actual, Some(expected));
    }
}
