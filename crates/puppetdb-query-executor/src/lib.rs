//! # puppetdb-query-executor
//!
//! Executes [`puppetdb-query`] queries against a PuppetDB instance and
//! returns the set of matching host names.
//!
//! ## Key Features
//!
//! - **One request per query** - the whole boolean tree is sent server side
//! - **Category aware** - fact queries go to `nodes`, resource queries to `resources`
//! - **Pluggable transport** - `reqwest` by default, any [`HttpTransport`] in tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use puppetdb_query::Query;
//! use puppetdb_query_executor::{PuppetDbConfig, ExecutorConfig, PuppetDbExecutor};
//!
//! let pdb = PuppetDbConfig { host: "puppetdb.example.org".into(), ..Default::default() };
//! let executor = PuppetDbExecutor::from_config(ExecutorConfig::from(&pdb))?;
//!
//! let mut query = Query::new();
//! query.add_hosts(&["db1*"], false);
//! query.add_and()?;
//! query.add_resource("Class", Some("Mysql"))?;
//!
//! let hosts = executor.execute(&query)?;
//! println!("Found {} database hosts", hosts.len());
//! ```
//!
//! ## Textual Queries
//!
//! ```ignore
//! let hosts = executor.execute_str("F:osfamily = Debian and not web*")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   puppetdb-query-executor                   │
//! │                                                             │
//! │  PuppetDbExecutor                                           │
//! │  ├── resolve category → endpoint + host key (EndpointTable) │
//! │  ├── serialize Query (puppetdb-query)                       │
//! │  ├── GET <base_url><endpoint>?query=... (HttpTransport)     │
//! │  └── collect host keys → HostSet                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
mod executor;
mod result;
mod traits;
mod transport;

// Public re-exports
pub use config::{Endpoint, EndpointTable, ExecutorConfig, ExecutorConfigBuilder, PuppetDbConfig};
pub use error::{ExecResult, ExecutorError};
pub use executor::PuppetDbExecutor;
pub use result::{ExecutionStats, HostSet};
pub use traits::{HttpResponse, HttpTransport};
pub use transport::ReqwestTransport;

// Re-export commonly used types from dependencies for convenience
pub use puppetdb_query::{parse_query, Category, Query, QueryError};
pub use reqwest::Url;
