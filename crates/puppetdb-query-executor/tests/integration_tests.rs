//! Integration tests for the PuppetDB executor.
//!
//! A mock transport plays the PuppetDB service: it serves canned JSON per
//! endpoint and records every request it receives.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use puppetdb_query::{Category, ComparisonOperator, Query, QueryError};
use puppetdb_query_executor::{
    ExecResult, ExecutorConfig, ExecutorError, HttpResponse, HttpTransport, PuppetDbExecutor, Url,
};

const BASE_URL: &str = "https://puppetdb.test:8081/v3/";

/// Mock PuppetDB answering per endpoint path.
struct MockPuppetDb {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<Url>>,
}

impl MockPuppetDb {
    fn new() -> Self {
        let mut mock = MockPuppetDb {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        };
        mock.respond(
            "nodes",
            200,
            r#"[{"name": "nodes_host1", "deactivated": null}, {"name": "nodes_host2", "deactivated": null}]"#,
        );
        mock.respond(
            "resources",
            200,
            r#"[{"certname": "resources_host1", "type": "Class"}, {"certname": "resources_host2", "type": "Class"}]"#,
        );
        mock
    }

    fn respond(&mut self, endpoint: &str, status: u16, body: &str) {
        self.responses
            .insert(format!("/v3/{endpoint}"), HttpResponse::new(status, body));
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    fn last_query(&self) -> String {
        let requests = self.requests();
        let url = requests.last().expect("no request was sent");
        url.query_pairs()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
            .expect("request has no query parameter")
    }
}

impl HttpTransport for MockPuppetDb {
    fn get(&self, url: &Url) -> ExecResult<HttpResponse> {
        self.requests.lock().unwrap().push(url.clone());
        Ok(self
            .responses
            .get(url.path())
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "not found")))
    }
}

fn executor(mock: &MockPuppetDb) -> PuppetDbExecutor<&MockPuppetDb> {
    let config = ExecutorConfig::builder().with_base_url(BASE_URL).build();
    PuppetDbExecutor::with_transport(mock, config)
}

fn set(hosts: &[&str]) -> HashSet<String> {
    hosts.iter().map(|h| h.to_string()).collect()
}

// ============================================================================
// Endpoint Selection
// ============================================================================

#[test]
fn test_fact_query_uses_nodes_endpoint() {
    let mut mock = MockPuppetDb::new();
    mock.respond(
        "nodes",
        200,
        r#"[{"name": "host1", "facts": 1}, {"name": "host2", "facts": 2}]"#,
    );
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_fact("key", "value").unwrap();
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["host1", "host2"]));
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path(), "/v3/nodes");
    assert_eq!(mock.last_query(), r#"["=", ["fact", "key"], "value"]"#);
}

#[test]
fn test_resource_query_uses_resources_endpoint() {
    let mut mock = MockPuppetDb::new();
    mock.respond(
        "resources",
        200,
        r#"[{"certname": "hostA", "title": "value"}, {"certname": "hostB", "title": "value"}]"#,
    );
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_resource("Class", Some("value")).unwrap();
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["hostA", "hostB"]));
    assert_eq!(mock.requests().len(), 1);
    assert_eq!(mock.requests()[0].path(), "/v3/resources");
    assert_eq!(
        mock.last_query(),
        r#"["and", ["=", "type", "Class"], ["=", "title", "value"]]"#
    );
}

#[test]
fn test_host_only_query_uses_nodes_endpoint() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["nodes_host1", "nodes_host2"], false);
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["nodes_host1", "nodes_host2"]));
    assert_eq!(mock.requests().len(), 1);
    assert_eq!(
        mock.last_query(),
        r#"["or", ["=", "name", "nodes_host1"], ["=", "name", "nodes_host2"]]"#
    );
}

#[test]
fn test_host_key_follows_resource_category() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["db1001"], false);
    query.add_and().unwrap();
    query
        .add_category(Category::Resource, "Class", Some("Mysql"), ComparisonOperator::Equal, false)
        .unwrap();
    executor.execute(&query).unwrap();

    assert_eq!(
        mock.last_query(),
        r#"["and", ["or", ["=", "certname", "db1001"]], ["and", ["=", "type", "Class"], ["=", "title", "Mysql"]]]"#
    );
}

// ============================================================================
// Boolean Structure
// ============================================================================

#[test]
fn test_with_boolean_operator() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["nodes_host1"], false);
    query.add_or().unwrap();
    query.add_hosts(&["nodes_host2"], false);
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["nodes_host1", "nodes_host2"]));
    assert_eq!(mock.requests().len(), 1);
    assert_eq!(
        mock.last_query(),
        r#"["or", ["or", ["=", "name", "nodes_host1"]], ["or", ["=", "name", "nodes_host2"]]]"#
    );
}

#[test]
fn test_with_subgroup() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.open_subgroup();
    query.add_hosts(&["nodes_host1"], false);
    query.add_or().unwrap();
    query.add_hosts(&["nodes_host2"], false);
    query.close_subgroup().unwrap();
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["nodes_host1", "nodes_host2"]));
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_complex_query() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.open_subgroup();
    query.add_hosts(&["resources_host1"], false);
    query.add_or().unwrap();
    query.add_hosts(&["resources_host2"], false);
    query.close_subgroup().unwrap();
    query.add_and().unwrap();
    query
        .add_category(Category::Resource, "Class", Some("MyClass"), ComparisonOperator::Equal, false)
        .unwrap();
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts, set(&["resources_host1", "resources_host2"]));
    assert_eq!(mock.requests().len(), 1);
    assert_eq!(
        mock.last_query(),
        concat!(
            r#"["and", ["or", ["or", ["=", "certname", "resources_host1"]], "#,
            r#"["or", ["=", "certname", "resources_host2"]]], "#,
            r#"["and", ["=", "type", "Class"], ["=", "title", "MyClass"]]]"#
        )
    );
}

#[test]
fn test_deep_tree_is_one_request() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    for depth in 0..5 {
        query.open_subgroup();
        query.add_fact(&format!("level{depth}"), "x").unwrap();
        query.add_and().unwrap();
    }
    query.add_hosts(&["leaf*"], true);
    for _ in 0..5 {
        query.close_subgroup().unwrap();
    }

    executor.execute(&query).unwrap();
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_glob_pattern_matches_hosts() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["h*"], false);
    executor.execute(&query).unwrap();

    let compiled = mock.last_query();
    assert_eq!(compiled, r#"["or", ["~", "name", "^h.*$"]]"#);

    let re = regex::Regex::new("^h.*$").unwrap();
    assert!(re.is_match("h1"));
    assert!(re.is_match("h2"));
    assert!(!re.is_match("web1"));
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_empty_query() {
    let mut mock = MockPuppetDb::new();
    mock.respond("nodes", 200, "[]");
    let executor = executor(&mock);

    let hosts = executor.execute(&Query::new()).unwrap();

    assert!(hosts.is_empty());
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query(), Some("query="));
}

#[test]
fn test_duplicates_collapse() {
    let mut mock = MockPuppetDb::new();
    mock.respond(
        "resources",
        200,
        r#"[{"certname": "db1", "title": "/etc/a"},
            {"certname": "db1", "title": "/etc/b"},
            {"certname": "db2", "title": "/etc/a"}]"#,
    );
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_resource("File", None).unwrap();
    let hosts = executor.execute(&query).unwrap();

    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts.to_sorted_vec(), vec!["db1", "db2"]);
    assert_eq!(hosts.stats.entries_received, 3);
}

#[test]
fn test_executing_twice_sends_two_requests() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["nodes_host1"], false);
    let first = executor.execute(&query).unwrap();
    let second = executor.execute(&query).unwrap();

    assert_eq!(first.hosts, second.hosts);
    assert_eq!(mock.requests().len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_http_error_status() {
    let mut mock = MockPuppetDb::new();
    mock.respond("nodes", 400, "invalid query");
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_fact("key", "value").unwrap();
    let err = executor.execute(&query).unwrap_err();

    assert!(err.is_transport());
    match err {
        ExecutorError::HttpStatus { status, url } => {
            assert_eq!(status, 400);
            assert!(url.starts_with("https://puppetdb.test:8081/v3/nodes?query="));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_server_error_status() {
    let mut mock = MockPuppetDb::new();
    mock.respond("resources", 503, "");
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_resource("Class", None).unwrap();
    assert!(matches!(
        executor.execute(&query),
        Err(ExecutorError::HttpStatus { status: 503, .. })
    ));
}

#[test]
fn test_malformed_body() {
    let mut mock = MockPuppetDb::new();
    mock.respond("nodes", 200, r#"{"error": "not an array"}"#);
    let executor = executor(&mock);

    let err = executor.execute(&Query::new()).unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn test_missing_host_key() {
    let mut mock = MockPuppetDb::new();
    mock.respond("nodes", 200, r#"[{"name": "ok"}, {"certname": "wrong-field"}]"#);
    let executor = executor(&mock);

    let err = executor.execute(&Query::new()).unwrap_err();
    assert!(matches!(err, ExecutorError::MissingHostKey { index: 1, .. }));
}

#[test]
fn test_missing_operator_fails_before_request() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let mut query = Query::new();
    query.add_hosts(&["a"], false);
    query.add_hosts(&["b"], false);
    let err = executor.execute(&query).unwrap_err();

    assert!(matches!(
        err,
        ExecutorError::Query(QueryError::InvalidQuery(_))
    ));
    assert!(mock.requests().is_empty());
}

#[test]
fn test_invalid_base_url() {
    let mock = MockPuppetDb::new();
    let config = ExecutorConfig::builder().with_base_url("not a url").build();
    let executor = PuppetDbExecutor::with_transport(&mock, config);

    assert!(matches!(
        executor.execute(&Query::new()),
        Err(ExecutorError::InvalidUrl { .. })
    ));
    assert!(mock.requests().is_empty());
}

// ============================================================================
// Textual Queries
// ============================================================================

#[test]
fn test_execute_str() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let hosts = executor
        .execute_str("(resources_host1 or resources_host2) and R:Class = MyClass")
        .unwrap();

    assert_eq!(hosts, set(&["resources_host1", "resources_host2"]));
    assert_eq!(mock.requests()[0].path(), "/v3/resources");
}

#[test]
fn test_execute_str_category_conflict() {
    let mock = MockPuppetDb::new();
    let executor = executor(&mock);

    let err = executor
        .execute_str("F:os = Debian and R:Class = Nginx")
        .unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::Query(QueryError::CategoryConflict { .. })
    ));
    assert!(mock.requests().is_empty());
}
