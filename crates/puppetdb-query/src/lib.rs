//! # puppetdb-query
//!
//! A Rust library for building boolean host-selection queries and compiling
//! them into the PuppetDB query language.
//!
//! This crate provides:
//! - **Query Builder**: a tree of nested groups populated through a cursor
//! - **Token Encoder**: fact, resource and host conditions in wire format
//! - **Serializer**: renders the tree into the PuppetDB JSON-array grammar
//! - **Parser**: a textual query syntax that drives the builder
//!
//! ## Builder Usage
//!
//! ```rust
//! use puppetdb_query::{Category, ComparisonOperator, Query};
//!
//! let mut query = Query::new();
//! query.add_hosts(&["web*"], false);
//! query.add_and().unwrap();
//! query
//!     .add_category(Category::Fact, "osfamily", Some("Debian"), ComparisonOperator::Equal, false)
//!     .unwrap();
//!
//! let compiled = query.to_query_string("name").unwrap().unwrap();
//! assert_eq!(
//!     compiled,
//!     r#"["and", ["or", ["~", "name", "^web.*$"]], ["=", ["fact", "osfamily"], "Debian"]]"#
//! );
//! ```
//!
//! ## Parser Usage
//!
//! ```rust
//! use puppetdb_query::parse_query;
//!
//! let query = parse_query("(db1* or db2001) and R:Class = Mysql").unwrap();
//! let compiled = query.to_query_string("certname").unwrap();
//! assert!(compiled.is_some());
//! ```
//!
//! ## Wire Grammar Quick Reference
//!
//! | Form | Meaning |
//! |------|---------|
//! | `[op, ["fact", K], V]` | fact `K` compared to `V` |
//! | `["not", T]` | negation |
//! | `["and"\|"or", T, ...]` | boolean combination |
//! | `["and", ["=", "type", T], ["=", "title", V]]` | resource `T` titled `V` |
//! | `["and", ["=", "type", T], ["=", ["parameter", P], V]]` | resource parameter |
//! | `["and", ["=", "type", T], ["=", F, V]]` | resource built-in field |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod error;
mod hosts;
mod parser;
mod query;
mod resource;
mod serializer;

pub use ast::{BoolOp, Category, ComparisonOperator, Operand, Term, HOST_KEY_PLACEHOLDER};
pub use error::{QueryError, QueryResult};
pub use hosts::{glob_to_regex, host_term, hosts_term, is_glob};
pub use parser::parse_query;
pub use query::{Group, GroupId, Query, Token};
pub use resource::ResourceKey;
pub use serializer::Serializer;
