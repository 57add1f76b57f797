//! Transport abstraction for query execution.
//!
//! The executor never talks to the network directly; it issues requests
//! through an [`HttpTransport`]. [`ReqwestTransport`](crate::ReqwestTransport)
//! is the production implementation, tests plug in an in-memory one.
//!
//! # Example: an in-memory transport
//!
//! ```rust
//! use puppetdb_query_executor::{ExecResult, HttpResponse, HttpTransport, Url};
//!
//! struct Canned(&'static str);
//!
//! impl HttpTransport for Canned {
//!     fn get(&self, _url: &Url) -> ExecResult<HttpResponse> {
//!         Ok(HttpResponse::new(200, self.0))
//!     }
//! }
//! ```

use reqwest::Url;

use crate::error::ExecResult;

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET capability.
///
/// Implementations return `Ok` for any response the server produced,
/// whatever its status; `Err` is reserved for failures to obtain one.
/// Timeouts and TLS belong to the implementation.
pub trait HttpTransport: Send + Sync {
    /// Issues a GET request for `url`.
    fn get(&self, url: &Url) -> ExecResult<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &Url) -> ExecResult<HttpResponse> {
        (**self).get(url)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get(&self, url: &Url) -> ExecResult<HttpResponse> {
        (**self).get(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(HttpResponse::new(200, "[]").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(400, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
