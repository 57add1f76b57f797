//! Resource key parsing.
//!
//! A resource key names a resource type, optionally followed by one selector:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `Class` | resource of type `Class` (title compared against the value, if any) |
//! | `File%ensure` | parameter `ensure` of a `File` resource |
//! | `File@tag` | built-in field `tag` of a `File` resource |

use crate::ast::{BoolOp, ComparisonOperator, Operand, Term};
use crate::error::{QueryError, QueryResult};

const FIELD_SEPARATOR: char = '@';
const PARAMETER_SEPARATOR: char = '%';

/// A parsed resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKey {
    /// Bare resource type.
    Type(String),
    /// Resource type plus parameter name.
    Parameter {
        /// Resource type.
        resource_type: String,
        /// Parameter name.
        parameter: String,
    },
    /// Resource type plus built-in field name.
    Field {
        /// Resource type.
        resource_type: String,
        /// Field name.
        field: String,
    },
}

impl ResourceKey {
    /// Parses a resource key, rejecting keys that carry both selectors.
    pub fn parse(key: &str) -> QueryResult<Self> {
        let has_field = key.contains(FIELD_SEPARATOR);
        let has_parameter = key.contains(PARAMETER_SEPARATOR);

        if has_field && has_parameter {
            return Err(QueryError::InvalidKey {
                key: key.to_string(),
                reason: "resource key cannot contain both a field and a parameter selector"
                    .to_string(),
            });
        }

        let parsed = if let Some((resource_type, field)) = key.split_once(FIELD_SEPARATOR) {
            ResourceKey::Field {
                resource_type: resource_type.to_string(),
                field: field.to_string(),
            }
        } else if let Some((resource_type, parameter)) = key.split_once(PARAMETER_SEPARATOR) {
            ResourceKey::Parameter {
                resource_type: resource_type.to_string(),
                parameter: parameter.to_string(),
            }
        } else {
            ResourceKey::Type(key.to_string())
        };

        if parsed.resource_type().is_empty() {
            return Err(QueryError::InvalidKey {
                key: key.to_string(),
                reason: "missing resource type".to_string(),
            });
        }

        Ok(parsed)
    }

    /// The resource type part of the key.
    pub fn resource_type(&self) -> &str {
        match self {
            ResourceKey::Type(resource_type)
            | ResourceKey::Parameter { resource_type, .. }
            | ResourceKey::Field { resource_type, .. } => resource_type,
        }
    }

    /// Builds the `["and", ["=", "type", T], ...]` term for this key.
    ///
    /// `operator` applies to the title, parameter or field comparison; the
    /// type is always matched exactly. A bare type without a value matches
    /// any title.
    pub fn to_term(&self, value: Option<&str>, operator: ComparisonOperator) -> Term {
        let mut terms = vec![Term::compare(
            ComparisonOperator::Equal,
            Operand::Field("type".to_string()),
            self.resource_type(),
        )];

        let selector = match self {
            ResourceKey::Type(_) => Operand::Field("title".to_string()),
            ResourceKey::Parameter { parameter, .. } => Operand::Parameter(parameter.clone()),
            ResourceKey::Field { field, .. } => Operand::Field(field.clone()),
        };

        if value.is_some() || !matches!(self, ResourceKey::Type(_)) {
            terms.push(Term::compare(operator, selector, value.unwrap_or_default()));
        }

        Term::Combine {
            operator: BoolOp::And,
            terms,
        }
    }
}
