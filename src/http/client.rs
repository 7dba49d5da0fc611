// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Serialize;

use super::request::{Body, Request};
use super::response::{Response, StreamingResponse};
use super::transport::{HttpClientConfig, ReqwestTransport, Transport};
use crate::error::Result;

/// HTTP client handed to host code
///
/// Clients are cheap to clone. Build them through
/// [`HookRegistry`](crate::network::HookRegistry) so that an installed
/// interceptor sees their traffic.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Create a plain client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Create a plain client with custom configuration
    pub fn with_config(config: &HttpClientConfig) -> Result<Self> {
        Ok(Self::from_transport(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Create a client on top of an arbitrary transport
    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute a GET request
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        self.execute(Request::get(url)?).await
    }

    /// Execute a POST request
    pub async fn post(&self, url: impl AsRef<str>, body: impl Into<Body>) -> Result<Response> {
        self.execute(Request::post(url)?.body(body)).await
    }

    /// Execute a request and buffer the whole response body
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let requested = request.url.clone();
        let response = self.transport.send(request).await?;
        response.buffer(&requested, start).await
    }

    /// Execute a request and hand back the body as a chunk stream
    pub async fn execute_streaming(&self, request: Request) -> Result<StreamingResponse> {
        self.transport.send(request).await
    }

    /// Execute multiple requests concurrently
    pub async fn execute_all(&self, requests: Vec<Request>) -> Vec<Result<Response>> {
        let futures: Vec<_> = requests.into_iter().map(|r| self.execute(r)).collect();
        futures::future::join_all(futures).await
    }

    /// Create a request builder
    pub fn request(&self, method: Method, url: impl AsRef<str>) -> Result<RequestBuilder> {
        Ok(RequestBuilder {
            client: self.clone(),
            request: Request::new(method, url)?,
        })
    }

    /// The transport requests are sent through
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// Builder for executing requests with the client
pub struct RequestBuilder {
    client: HttpClient,
    request: Request,
}

impl RequestBuilder {
    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.request = self.request.json(data)?;
        Ok(self)
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.timeout(timeout);
        self
    }

    /// Execute the request
    pub async fn send(self) -> Result<Response> {
        self.client.execute(self.request).await
    }
}
