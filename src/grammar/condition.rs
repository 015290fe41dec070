//! Leaf data of the condition syntax.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::quote::{is_bare_value, quote};

/// A `left operator right` comparison, with both operands de-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub left: String,
    /// Canonical uppercase operator, e.g. `=`, `NOT LIKE`, `IS`.
    pub operator: String,
    pub right: String,
}

impl Condition {
    pub fn new(
        left: impl Into<String>,
        operator: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            operator: operator.into(),
            right: right.into(),
        }
    }
}

fn is_bare_field(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '{' | '}' | '-'))
}

/// Renders back to condition syntax, quoting operands that need it.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_bare_field(&self.left) {
            write!(f, "{}", self.left)?;
        } else {
            write!(f, "{}", quote(&self.left))?;
        }
        write!(f, " {} ", self.operator)?;
        if is_bare_value(&self.right) {
            write!(f, "{}", self.right)
        } else {
            write!(f, "{}", quote(&self.right))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_bare() {
        let cond = Condition::new("x", "=", "10");
        assert_eq!(cond.to_string(), "x = 10");
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let cond = Condition::new("full name", "LIKE", "Jo%n (jr)");
        assert_eq!(cond.to_string(), "'full name' LIKE 'Jo%n (jr)'");

        let cond = Condition::new("x", "=", "");
        assert_eq!(cond.to_string(), "x = ''");
    }
}
