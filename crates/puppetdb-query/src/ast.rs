//! Wire-level AST for the PuppetDB query language.
//!
//! Every condition the builder produces is a [`Term`]. Terms render to the
//! JSON-array grammar PuppetDB expects, e.g.
//! `["and", ["=", "type", "Class"], ["=", "title", "Nginx"]]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};

/// Placeholder used when a term is displayed without a resolved host key.
pub const HOST_KEY_PLACEHOLDER: &str = "{host_key}";

// =============================================================================
// Category
// =============================================================================

/// Query family. A single query targets either facts or resources, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    /// Fact based query (`F:`), answered by the nodes endpoint.
    Fact,
    /// Resource based query (`R:`), answered by the resources endpoint.
    Resource,
}

impl Category {
    /// Short prefix used by the textual query syntax.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Fact => "F",
            Category::Resource => "R",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Category {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s {
            "F" | "fact" => Ok(Category::Fact),
            "R" | "resource" => Ok(Category::Resource),
            other => Err(QueryError::InvalidCategoryValue(other.to_string())),
        }
    }
}

// =============================================================================
// Operators
// =============================================================================

/// Boolean combinator of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BoolOp {
    /// Every operand must match.
    And,
    /// Any operand may match.
    Or,
}

impl BoolOp {
    /// Keyword as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOperator {
    /// `=`
    #[default]
    Equal,
    /// `>=`
    GreaterThanOrEqual,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `~` (regular expression match)
    Regex,
}

impl ComparisonOperator {
    /// Operator as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::Regex => "~",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s {
            "=" => Ok(ComparisonOperator::Equal),
            ">=" => Ok(ComparisonOperator::GreaterThanOrEqual),
            "<=" => Ok(ComparisonOperator::LessThanOrEqual),
            ">" => Ok(ComparisonOperator::GreaterThan),
            "<" => Ok(ComparisonOperator::LessThan),
            "~" => Ok(ComparisonOperator::Regex),
            other => Err(QueryError::InvalidOperator(other.to_string())),
        }
    }
}

// =============================================================================
// Terms
// =============================================================================

/// Left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `["fact", K]`
    Fact(String),
    /// A built-in field such as `type`, `title` or `tag`.
    Field(String),
    /// `["parameter", P]`
    Parameter(String),
    /// The host identity field of whichever endpoint ends up being queried.
    HostKey,
}

/// A wire-ready condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// `[op, operand, value]`
    Compare {
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Left-hand side.
        operand: Operand,
        /// Right-hand side, always sent as a string.
        value: String,
    },
    /// `["not", term]`
    Not(Box<Term>),
    /// `["and"|"or", term, ...]`
    Combine {
        /// Combinator.
        operator: BoolOp,
        /// Operands in insertion order.
        terms: Vec<Term>,
    },
}

impl Term {
    /// Creates a comparison term.
    pub fn compare(operator: ComparisonOperator, operand: Operand, value: impl Into<String>) -> Self {
        Term::Compare {
            operator,
            operand,
            value: value.into(),
        }
    }

    /// Wraps `self` in a negation when `negate` is set.
    pub fn negate_if(self, negate: bool) -> Self {
        if negate {
            Term::Not(Box::new(self))
        } else {
            self
        }
    }

    /// Renders the term, substituting `host_key` for [`Operand::HostKey`].
    pub fn render(&self, host_key: &str) -> String {
        let mut out = String::new();
        self.write_to(&mut out, host_key);
        out
    }

    fn write_to(&self, out: &mut String, host_key: &str) {
        match self {
            Term::Compare {
                operator,
                operand,
                value,
            } => {
                out.push('[');
                out.push_str(&quote(operator.as_str()));
                out.push_str(", ");
                match operand {
                    Operand::Fact(key) => {
                        out.push_str("[\"fact\", ");
                        out.push_str(&quote(key));
                        out.push(']');
                    }
                    Operand::Parameter(name) => {
                        out.push_str("[\"parameter\", ");
                        out.push_str(&quote(name));
                        out.push(']');
                    }
                    Operand::Field(name) => out.push_str(&quote(name)),
                    Operand::HostKey => out.push_str(&quote(host_key)),
                }
                out.push_str(", ");
                out.push_str(&quote(value));
                out.push(']');
            }
            Term::Not(inner) => {
                out.push_str("[\"not\", ");
                inner.write_to(out, host_key);
                out.push(']');
            }
            Term::Combine { operator, terms } => {
                out.push('[');
                out.push_str(&quote(operator.as_str()));
                for term in terms {
                    out.push_str(", ");
                    term.write_to(out, host_key);
                }
                out.push(']');
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(HOST_KEY_PLACEHOLDER))
    }
}

/// JSON string literal for `s`.
pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}
