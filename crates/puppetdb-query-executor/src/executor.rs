//! PuppetDB query executor implementation.

use std::collections::HashSet;
use std::time::Instant;

use puppetdb_query::{Category, Query, Serializer};
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{Endpoint, ExecutorConfig};
use crate::error::{ExecResult, ExecutorError};
use crate::result::{ExecutionStats, HostSet};
use crate::traits::HttpTransport;
use crate::transport::ReqwestTransport;

/// Main query execution engine.
///
/// The executor compiles a [`Query`] for the endpoint its category maps to,
/// sends exactly one GET request through an [`HttpTransport`] and collects
/// the host identity field of every returned entry.
///
/// # Example
///
/// ```ignore
/// use puppetdb_query::Query;
/// use puppetdb_query_executor::{ExecutorConfig, PuppetDbExecutor};
///
/// let executor = PuppetDbExecutor::from_config(ExecutorConfig::default())?;
///
/// let mut query = Query::new();
/// query.add_fact("osfamily", "Debian")?;
/// let hosts = executor.execute(&query)?;
/// println!("Found {} Debian hosts", hosts.len());
/// ```
#[derive(Debug)]
pub struct PuppetDbExecutor<T = ReqwestTransport> {
    /// Transport used for the request.
    transport: T,
    /// Executor configuration.
    config: ExecutorConfig,
}

impl PuppetDbExecutor<ReqwestTransport> {
    /// Creates an executor talking to the default `https://localhost:443/v3/`.
    pub fn new() -> ExecResult<Self> {
        Self::from_config(ExecutorConfig::default())
    }

    /// Creates an executor with a [`ReqwestTransport`] built from `config`.
    pub fn from_config(config: ExecutorConfig) -> ExecResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> PuppetDbExecutor<T> {
    /// Creates an executor with a custom transport.
    pub fn with_transport(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    /// Returns a reference to the executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Returns a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Category and endpoint `query` will be sent to.
    ///
    /// Queries without a category (host-only or empty) go to the fact
    /// endpoint.
    pub fn resolve(&self, query: &Query) -> (Category, &Endpoint) {
        let category = query.category().unwrap_or(Category::Fact);
        (category, self.config.endpoints.resolve(category))
    }

    /// Builds the request URL for `query`.
    ///
    /// The endpoint path is appended to the base URL with exactly one `/`
    /// between them. The serialized query is passed URL-encoded in the
    /// `query` parameter; a query matching everything sends it empty.
    pub fn request_url(&self, query: &Query) -> ExecResult<Url> {
        let (category, endpoint) = self.resolve(query);
        let compiled = Serializer::serialize_query(query, &endpoint.host_key)?;
        debug!(
            %category,
            endpoint = %endpoint.path,
            query = compiled.as_deref().unwrap_or(""),
            "compiled query"
        );

        let raw = endpoint_url(&self.config.base_url, &endpoint.path);
        let mut url = Url::parse(&raw).map_err(|e| ExecutorError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("query", compiled.as_deref().unwrap_or(""));
        Ok(url)
    }

    /// Executes `query` and returns the matching hosts.
    ///
    /// # Returns
    ///
    /// * `Ok(HostSet)` - Deduplicated host identities, empty for an empty response
    /// * `Err(ExecutorError)` - Compilation, transport or response errors; no
    ///   partial result is returned and nothing is retried
    pub fn execute(&self, query: &Query) -> ExecResult<HostSet> {
        let start = Instant::now();
        let (_, endpoint) = self.resolve(query);
        let url = self.request_url(query)?;

        debug!(%url, "querying PuppetDB");
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            warn!(status = response.status, %url, "PuppetDB query failed");
            return Err(ExecutorError::HttpStatus {
                status: response.status,
                url: url.to_string(),
            });
        }

        let (hosts, entries) = extract_hosts(&response.body, &endpoint.host_key)?;
        debug!(hosts = hosts.len(), entries, "PuppetDB query completed");

        let stats = ExecutionStats::new(start.elapsed(), entries);
        Ok(HostSet::new(hosts, stats))
    }

    /// Parses a textual query and executes it.
    pub fn execute_str(&self, query: &str) -> ExecResult<HostSet> {
        let query = puppetdb_query::parse_query(query)?;
        self.execute(&query)
    }
}

/// Concatenates the base URL and an endpoint path.
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Collects `host_key` from every object of a JSON array body.
fn extract_hosts(body: &str, host_key: &str) -> ExecResult<(HashSet<String>, usize)> {
    let entries: Vec<Map<String, Value>> = serde_json::from_str(body)?;

    let mut hosts = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let host = entry.get(host_key).and_then(Value::as_str).ok_or_else(|| {
            ExecutorError::MissingHostKey {
                index,
                key: host_key.to_string(),
            }
        })?;
        hosts.insert(host.to_string());
    }

    Ok((hosts, entries.len()))
}
