//! Configuration types for the PuppetDB executor.

use std::time::Duration;

use puppetdb_query::Category;
use serde::{Deserialize, Serialize};

/// An API endpoint and the response field naming a matched host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Path relative to the API base URL, e.g. `nodes`.
    pub path: String,
    /// JSON field holding the host identity, e.g. `name`.
    pub host_key: String,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(path: impl Into<String>, host_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host_key: host_key.into(),
        }
    }
}

/// Category to endpoint mapping.
///
/// Defaults to `nodes`/`name` for facts and `resources`/`certname` for
/// resources. The table is read-only once handed to an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTable {
    /// Endpoint answering fact and host-only queries.
    pub fact: Endpoint,
    /// Endpoint answering resource queries.
    pub resource: Endpoint,
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self {
            fact: Endpoint::new("nodes", "name"),
            resource: Endpoint::new("resources", "certname"),
        }
    }
}

impl EndpointTable {
    /// Endpoint serving `category`.
    pub fn resolve(&self, category: Category) -> &Endpoint {
        match category {
            Category::Fact => &self.fact,
            Category::Resource => &self.resource,
        }
    }
}

/// Connection settings for a PuppetDB instance.
///
/// Deserializable so the host application can embed it in its own
/// configuration file; every field has a default.
///
/// # Example
///
/// ```rust
/// use puppetdb_query_executor::PuppetDbConfig;
///
/// let config: PuppetDbConfig =
///     serde_json::from_str(r#"{"host": "puppetdb.example.org", "port": 8081}"#).unwrap();
/// assert_eq!(config.base_url(), "https://puppetdb.example.org:8081/v3/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuppetDbConfig {
    /// URL scheme.
    pub scheme: String,
    /// PuppetDB host name.
    pub host: String,
    /// PuppetDB port.
    pub port: u16,
    /// Query API version.
    pub api_version: u32,
    /// Request timeout in seconds (None = client default).
    pub timeout: Option<u64>,
    /// Per-category endpoints.
    pub endpoints: EndpointTable,
}

impl Default for PuppetDbConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "localhost".to_string(),
            port: 443,
            api_version: 3,
            timeout: None,
            endpoints: EndpointTable::default(),
        }
    }
}

impl PuppetDbConfig {
    /// Base URL of the query API, always ending with `/`.
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}/v{}/",
            self.scheme, self.host, self.port, self.api_version
        )
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Configuration for the executor.
///
/// # Example
///
/// ```rust
/// use puppetdb_query_executor::{Endpoint, EndpointTable, ExecutorConfig};
/// use std::time::Duration;
///
/// let config = ExecutorConfig::builder()
///     .with_base_url("http://127.0.0.1:8080/pdb/query/v4/")
///     .with_endpoints(EndpointTable {
///         fact: Endpoint::new("nodes", "certname"),
///         resource: Endpoint::new("resources", "certname"),
///     })
///     .with_timeout(Duration::from_secs(30))
///     .build();
/// assert_eq!(config.timeout, Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Category to endpoint mapping.
    pub endpoints: EndpointTable,
    /// Request timeout (None = client default).
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from(&PuppetDbConfig::default())
    }
}

impl From<&PuppetDbConfig> for ExecutorConfig {
    fn from(config: &PuppetDbConfig) -> Self {
        Self {
            base_url: config.base_url(),
            endpoints: config.endpoints.clone(),
            timeout: config.timeout(),
        }
    }
}

impl ExecutorConfig {
    /// Creates a new builder for ExecutorConfig.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }
}

/// Builder for ExecutorConfig.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfigBuilder {
    base_url: Option<String>,
    endpoints: Option<EndpointTable>,
    timeout: Option<Duration>,
}

impl ExecutorConfigBuilder {
    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the endpoint table.
    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the ExecutorConfig.
    pub fn build(self) -> ExecutorConfig {
        let defaults = ExecutorConfig::default();
        ExecutorConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            endpoints: self.endpoints.unwrap_or(defaults.endpoints),
            timeout: self.timeout,
        }
    }
}
