//! Query serializer.
//!
//! Renders the group tree of a [`Query`] into the PuppetDB wire grammar:
//!
//! - a group without tokens matches everything and renders to nothing,
//! - a group with one token renders to that token,
//! - a group with several tokens renders to `[op, token, ...]` and needs a
//!   declared boolean operator.

use crate::ast::quote;
use crate::error::{QueryError, QueryResult};
use crate::query::{GroupId, Query, Token};

/// Query serializer.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    _private: (),
}

impl Serializer {
    /// Create a new serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `query`, substituting `host_key` for host conditions.
    ///
    /// Returns `Ok(None)` for a query that matches everything.
    pub fn serialize(&self, query: &Query, host_key: &str) -> QueryResult<Option<String>> {
        Self::serialize_query(query, host_key)
    }

    /// Serializes `query` (static method).
    pub fn serialize_query(query: &Query, host_key: &str) -> QueryResult<Option<String>> {
        Self::render_group(query, query.root_id(), host_key)
    }

    fn render_group(query: &Query, id: GroupId, host_key: &str) -> QueryResult<Option<String>> {
        let group = query
            .group(id)
            .ok_or_else(|| QueryError::InvalidQuery(format!("unknown group {}", id.index())))?;

        match group.tokens() {
            [] => Ok(None),
            [token] => Self::render_token(query, token, host_key),
            tokens => {
                let operator = group.operator().ok_or_else(|| {
                    QueryError::InvalidQuery(format!(
                        "group with {} tokens has no boolean operator",
                        tokens.len()
                    ))
                })?;

                let mut out = format!("[{}", quote(operator.as_str()));
                for token in tokens {
                    let rendered = Self::render_token(query, token, host_key)?.ok_or_else(|| {
                        QueryError::InvalidQuery(format!(
                            "empty subgroup inside an '{operator}' combination"
                        ))
                    })?;
                    out.push_str(", ");
                    out.push_str(&rendered);
                }
                out.push(']');
                Ok(Some(out))
            }
        }
    }

    fn render_token(query: &Query, token: &Token, host_key: &str) -> QueryResult<Option<String>> {
        match token {
            Token::Term(term) => Ok(Some(term.render(host_key))),
            Token::Group(child) => Self::render_group(query, *child, host_key),
        }
    }
}

impl Query {
    /// Serializes the query with the given host identity field.
    ///
    /// See [`Serializer::serialize`].
    pub fn to_query_string(&self, host_key: &str) -> QueryResult<Option<String>> {
        Serializer::serialize_query(self, host_key)
    }
}
