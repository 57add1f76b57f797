//! Group tree and query builder.
//!
//! A [`Query`] owns an arena of [`Group`]s. Groups refer to their parent and
//! to their child groups by [`GroupId`], so the tree has a single owner and no
//! reference cycles. The builder keeps a cursor on the group currently being
//! populated; [`Query::open_subgroup`] and [`Query::close_subgroup`] move it.

use tracing::trace;

use crate::ast::{BoolOp, Category, ComparisonOperator, Operand, Term};
use crate::error::{QueryError, QueryResult};
use crate::hosts::hosts_term;
use crate::resource::ResourceKey;

/// Handle of a group inside a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// Index of the group in the query's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element of a group: a condition or a nested group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A rendered-on-demand condition.
    Term(Term),
    /// A child group.
    Group(GroupId),
}

/// A node of the query tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    parent: Option<GroupId>,
    operator: Option<BoolOp>,
    tokens: Vec<Token>,
}

impl Group {
    fn child_of(parent: GroupId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Enclosing group, `None` for the root.
    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    /// Declared boolean operator, if any.
    pub fn operator(&self) -> Option<BoolOp> {
        self.operator
    }

    /// Tokens in insertion order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns true if the group holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A PuppetDB query under construction.
///
/// # Example
///
/// ```rust
/// use puppetdb_query::{Category, ComparisonOperator, Query};
///
/// let mut query = Query::new();
/// query.open_subgroup();
/// query.add_hosts(&["db1*"], false);
/// query.add_or().unwrap();
/// query.add_hosts(&["db2001"], false);
/// query.close_subgroup().unwrap();
/// query.add_and().unwrap();
/// query
///     .add_category(Category::Resource, "Class", Some("Mysql"), ComparisonOperator::Equal, false)
///     .unwrap();
///
/// assert_eq!(query.category(), Some(Category::Resource));
/// assert_eq!(query.root().tokens().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    groups: Vec<Group>,
    current: GroupId,
    category: Option<Category>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    const ROOT: GroupId = GroupId(0);

    /// Creates an empty query: a root group without tokens and no category.
    pub fn new() -> Self {
        Self {
            groups: vec![Group::default()],
            current: Self::ROOT,
            category: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Category of the query, if any condition set it.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Handle of the root group.
    pub fn root_id(&self) -> GroupId {
        Self::ROOT
    }

    /// The root group.
    pub fn root(&self) -> &Group {
        &self.groups[Self::ROOT.0]
    }

    /// Handle of the group under the cursor.
    pub fn current_id(&self) -> GroupId {
        self.current
    }

    /// The group under the cursor.
    pub fn current_group(&self) -> &Group {
        &self.groups[self.current.0]
    }

    /// Looks up a group by handle.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    /// Returns true if the cursor is on the root group.
    pub fn is_at_root(&self) -> bool {
        self.current == Self::ROOT
    }

    /// Number of open subgroups between the root and the cursor.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut id = self.current;
        while let Some(parent) = self.groups[id.0].parent {
            depth += 1;
            id = parent;
        }
        depth
    }

    // =========================================================================
    // Category guard
    // =========================================================================

    /// Sets the query category.
    ///
    /// Setting the same category again is a no-op; switching to the other
    /// family fails with [`QueryError::CategoryConflict`].
    pub fn set_category(&mut self, category: Category) -> QueryResult<()> {
        match self.category {
            Some(current) if current != category => Err(QueryError::CategoryConflict {
                current,
                requested: category,
            }),
            _ => {
                self.category = Some(category);
                Ok(())
            }
        }
    }

    /// Adds a fact or resource condition to the current group.
    ///
    /// For facts the condition is `[operator, ["fact", key], value]` and a
    /// value is required. For resources `key` is parsed as a [`ResourceKey`].
    /// Nothing is modified when the condition or the category is rejected.
    pub fn add_category(
        &mut self,
        category: Category,
        key: &str,
        value: Option<&str>,
        operator: ComparisonOperator,
        negate: bool,
    ) -> QueryResult<()> {
        let term = match category {
            Category::Fact => {
                let value = value.ok_or_else(|| {
                    QueryError::InvalidQuery(format!("fact condition on '{key}' has no value"))
                })?;
                Term::compare(operator, Operand::Fact(key.to_string()), value)
            }
            Category::Resource => ResourceKey::parse(key)?.to_term(value, operator),
        };

        self.set_category(category)?;
        self.push(Token::Term(term.negate_if(negate)));
        Ok(())
    }

    /// Shorthand for an equality fact condition.
    pub fn add_fact(&mut self, key: &str, value: &str) -> QueryResult<()> {
        self.add_category(Category::Fact, key, Some(value), ComparisonOperator::Equal, false)
    }

    /// Shorthand for an equality resource condition.
    pub fn add_resource(&mut self, key: &str, value: Option<&str>) -> QueryResult<()> {
        self.add_category(Category::Resource, key, value, ComparisonOperator::Equal, false)
    }

    // =========================================================================
    // Hosts
    // =========================================================================

    /// Adds a single `or` condition matching any of `hosts`.
    ///
    /// An empty slice leaves the query untouched.
    pub fn add_hosts<S: AsRef<str>>(&mut self, hosts: &[S], negate: bool) {
        if let Some(term) = hosts_term(hosts, negate) {
            self.push(Token::Term(term));
        }
    }

    // =========================================================================
    // Group tree
    // =========================================================================

    /// Opens a new empty subgroup in the current group and moves into it.
    pub fn open_subgroup(&mut self) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group::child_of(self.current));
        self.push(Token::Group(id));
        self.current = id;
        trace!(group = id.0, depth = self.depth(), "opened subgroup");
        id
    }

    /// Moves the cursor back to the parent of the current group.
    ///
    /// Fails with [`QueryError::InvalidQuery`] when the cursor is on the root.
    pub fn close_subgroup(&mut self) -> QueryResult<()> {
        let parent = self.current_group().parent.ok_or_else(|| {
            QueryError::InvalidQuery("no open subgroup to close".to_string())
        })?;
        trace!(group = self.current.0, "closed subgroup");
        self.current = parent;
        Ok(())
    }

    /// Declares `and` as the current group's boolean operator.
    pub fn add_and(&mut self) -> QueryResult<()> {
        self.set_operator(BoolOp::And)
    }

    /// Declares `or` as the current group's boolean operator.
    pub fn add_or(&mut self) -> QueryResult<()> {
        self.set_operator(BoolOp::Or)
    }

    fn set_operator(&mut self, operator: BoolOp) -> QueryResult<()> {
        let group = &mut self.groups[self.current.0];
        match group.operator {
            Some(existing) if existing != operator => Err(QueryError::InvalidQuery(format!(
                "got unexpected '{operator}' boolean operator, current operator was '{existing}'"
            ))),
            Some(_) => Ok(()),
            None => {
                trace!(group = self.current.0, %operator, "declared boolean operator");
                group.operator = Some(operator);
                Ok(())
            }
        }
    }

    fn push(&mut self, token: Token) {
        self.groups[self.current.0].tokens.push(token);
    }
}
