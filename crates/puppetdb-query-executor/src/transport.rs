//! `reqwest` backed transport.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::trace;

use crate::error::ExecResult;
use crate::traits::{HttpResponse, HttpTransport};

/// Blocking HTTP transport over [`reqwest::blocking::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with an optional request timeout.
    pub fn new(timeout: Option<Duration>) -> ExecResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wraps a pre-configured client (custom CA, client certificates, proxies).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &Url) -> ExecResult<HttpResponse> {
        let response = self.client.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        trace!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}
