//! Pruning leaves out of a tree.

use super::{Element, Group, Tree};

/// Build a new tree keeping only the leaves `predicate` accepts.
///
/// A dropped term takes the operator that joined it to its left neighbour
/// with it. When a term is dropped at the start of a group, the operator
/// after it goes as well, since there is nothing left for it to join.
/// Groups that end up empty disappear, single-term groups collapse to their
/// term, and a tree with every leaf rejected becomes an empty tree. The input
/// tree is not modified.
///
/// # Example
///
/// ```
/// use boolparse::{filter, to_tree};
///
/// let tree = to_tree("a OR (b AND c) OR d").unwrap();
/// let kept = filter(&tree, |leaf| leaf != "b");
/// assert_eq!(kept.to_string(), "a OR c OR d");
/// ```
pub fn filter<T: Clone>(tree: &Tree<T>, mut predicate: impl FnMut(&T) -> bool) -> Tree<T> {
    let filtered = match filter_group(tree, &mut predicate, false) {
        Element::Group(group) => group,
        other => Group::from_elements(vec![other]),
    };
    tracing::trace!(
        before = tree.len(),
        after = filtered.len(),
        "filtered expression tree"
    );
    filtered
}

fn filter_group<T, P>(group: &Group<T>, predicate: &mut P, inner: bool) -> Element<T>
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    let mut out: Vec<Element<T>> = Vec::with_capacity(group.len());
    let mut skip = 0usize;

    for element in group {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        let kept = match element {
            Element::Operator(op) => {
                out.push(Element::Operator(*op));
                continue;
            }
            Element::Leaf(leaf) => predicate(leaf).then(|| Element::Leaf(leaf.clone())),
            Element::Group(sub) => match filter_group(sub, predicate, true) {
                Element::Group(filtered) if filtered.is_empty() => None,
                filtered => Some(filtered),
            },
        };
        match kept {
            Some(element) => out.push(element),
            None => {
                out.pop();
                if out.is_empty() {
                    skip = 1;
                }
            }
        }
    }

    if out.len() == 1 && (inner || matches!(out[0], Element::Group(_))) {
        if let Some(only) = out.pop() {
            return only;
        }
    }
    Element::Group(Group::from_elements(out))
}
