//! Transport seam between the executor and the network

use std::time::Duration;

use crudcheck_core::{ObservedResponse, RequestSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("cannot read response body: {0}")]
    Body(String),
}

/// Sends one built request and returns the observed status and body.
///
/// Implemented by [`HttpTransport`] for live runs; tests plug in stand-in
/// services.
pub trait Transport {
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be observed.
    fn send(&self, request: &RequestSnapshot) -> Result<ObservedResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &RequestSnapshot) -> Result<ObservedResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestSnapshot) -> Result<ObservedResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;

        let mut req = self.client.request(method, &request.url);
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let response = req
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(ObservedResponse { status, body })
    }
}
