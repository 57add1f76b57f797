//! Result types for query execution.

use std::collections::HashSet;
use std::time::Duration;

/// Hosts matched by a query.
///
/// Deduplicated and unordered; use [`HostSet::to_sorted_vec`] for stable
/// output.
///
/// # Example
///
/// ```ignore
/// let hosts = executor.execute(&query)?;
///
/// println!("Matched {} hosts", hosts.len());
/// for host in hosts.to_sorted_vec() {
///     println!("{host}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostSet {
    /// Matching host names.
    pub hosts: HashSet<String>,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

impl HostSet {
    /// Creates a new HostSet.
    pub fn new(hosts: HashSet<String>, stats: ExecutionStats) -> Self {
        Self { hosts, stats }
    }

    /// Creates an empty HostSet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of matched hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns true if no host matched.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Checks whether `host` matched.
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Returns an iterator over matched hosts.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.hosts.iter()
    }

    /// Converts the set to a sorted Vec.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut vec: Vec<String> = self.hosts.iter().cloned().collect();
        vec.sort_unstable();
        vec
    }
}

impl PartialEq<HashSet<String>> for HostSet {
    fn eq(&self, other: &HashSet<String>) -> bool {
        &self.hosts == other
    }
}

impl IntoIterator for HostSet {
    type Item = String;
    type IntoIter = std::collections::hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = &'a String;
    type IntoIter = std::collections::hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}

/// Statistics from query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Total execution duration, request included.
    pub duration: Duration,
    /// Number of entries in the response array.
    pub entries_received: usize,
}

impl ExecutionStats {
    /// Creates new execution stats.
    pub fn new(duration: Duration, entries_received: usize) -> Self {
        Self {
            duration,
            entries_received,
        }
    }
}
