//! Host pattern compiler.
//!
//! Literal host names become exact matches on the host identity field,
//! names containing `*` become anchored regular expression matches.

use crate::ast::{BoolOp, ComparisonOperator, Operand, Term};

const WILDCARD: char = '*';

/// Returns true if `host` contains a glob wildcard.
pub fn is_glob(host: &str) -> bool {
    host.contains(WILDCARD)
}

/// Translates a glob into an anchored regular expression.
///
/// `*` matches any sequence; every other regex metacharacter is escaped.
///
/// ```rust
/// use puppetdb_query::glob_to_regex;
///
/// assert_eq!(glob_to_regex("web*.example"), r"^web.*\.example$");
/// ```
pub fn glob_to_regex(glob: &str) -> String {
    let body = glob
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{body}$")
}

/// Builds the match term for a single host specification.
pub fn host_term(host: &str) -> Term {
    if is_glob(host) {
        Term::compare(ComparisonOperator::Regex, Operand::HostKey, glob_to_regex(host))
    } else {
        Term::compare(ComparisonOperator::Equal, Operand::HostKey, host)
    }
}

/// Combines the per-host terms into a single `or` term, or `None` for no hosts.
pub fn hosts_term<S: AsRef<str>>(hosts: &[S], negate: bool) -> Option<Term> {
    if hosts.is_empty() {
        return None;
    }

    let terms = hosts.iter().map(|h| host_term(h.as_ref())).collect();
    Some(
        Term::Combine {
            operator: BoolOp::Or,
            terms,
        }
        .negate_if(negate),
    )
}
