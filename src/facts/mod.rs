//! Evaluating conditions against known field values.
//!
//! A [`Facts`] map answers each [`Condition`] of a condition tree, so it can
//! drive [`solve`](crate::solve), [`fsolve`](crate::fsolve) and
//! [`filter`](crate::filter) directly:
//!
//! ```
//! use boolparse::{Facts, fsolve, solve, to_condition_tree};
//!
//! let facts: Facts = [("status", "open"), ("priority", "3")].into_iter().collect();
//! let tree = to_condition_tree("status = open AND (priority > 2 OR owner = me)").unwrap();
//! assert!(solve(&tree, |c| facts.holds(c)));
//! assert_eq!(fsolve(&tree, |c| facts.check(c)), Some(true));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::grammar::Condition;

/// Field values a condition can be checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    values: HashMap<String, String>,
}

impl Facts {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `condition` can be decided from these facts.
    pub fn knows(&self, condition: &Condition) -> bool {
        self.check(condition).is_some()
    }

    /// Two-state check: conditions on unknown fields are false.
    pub fn holds(&self, condition: &Condition) -> bool {
        self.check(condition).unwrap_or(false)
    }

    /// Three-state check: `None` when the condition names a field with no
    /// known value, or an operator that is not recognized.
    ///
    /// `IS NULL` and `IS NOT NULL` test whether the field is known at all and
    /// are always decided.
    pub fn check(&self, condition: &Condition) -> Option<bool> {
        let field = self.get(&condition.left);
        let right = condition.right.as_str();

        if right.eq_ignore_ascii_case("NULL") {
            match condition.operator.as_str() {
                "IS" => return Some(field.is_none()),
                "IS NOT" => return Some(field.is_some()),
                _ => {}
            }
        }

        let value = field?;
        let result = match condition.operator.as_str() {
            "=" | "IS" => ordering(value, right) == Ordering::Equal,
            "!=" | "<>" | "IS NOT" => ordering(value, right) != Ordering::Equal,
            "<" => ordering(value, right) == Ordering::Less,
            "<=" => ordering(value, right) != Ordering::Greater,
            ">" => ordering(value, right) == Ordering::Greater,
            ">=" => ordering(value, right) != Ordering::Less,
            "LIKE" => like_match(right, value),
            "NOT LIKE" => !like_match(right, value),
            "MATCHES" => value.contains(right),
            "NOT MATCHES" => !value.contains(right),
            "STARTSWITH" => value.starts_with(right),
            "ENDSWITH" => value.ends_with(right),
            other => {
                tracing::debug!(operator = other, "unrecognized comparison operator");
                return None;
            }
        };
        Some(result)
    }
}

impl From<HashMap<String, String>> for Facts {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric order when both sides are numbers, string order otherwise.
fn ordering(left: &str, right: &str) -> Ordering {
    match (parse_numeric(left), parse_numeric(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

/// Case-insensitive `LIKE` where `%` matches any run of characters.
fn like_match(pattern: &str, value: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let value = value.to_lowercase();

    let parts: Vec<&str> = pattern.split('%').collect();
    let (Some((first, rest)), Some(last)) = (parts.split_first(), parts.last()) else {
        return false;
    };
    if rest.is_empty() {
        return pattern == value;
    }

    if value.len() < first.len() + last.len()
        || !value.starts_with(first)
        || !value[first.len()..].ends_with(last)
    {
        return false;
    }

    let mut remaining = &value[first.len()..value.len() - last.len()];
    for part in rest[..rest.len() - 1].iter().filter(|p| !p.is_empty()) {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    true
}
