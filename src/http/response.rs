// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use std::fmt;
use std::pin::Pin;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// Chunked response body
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Response as delivered by a transport: head first, body as a chunk stream
pub struct StreamingResponse {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Final URL (after redirects)
    pub url: Url,
    /// Body chunks
    pub body: ResponseStream,
}

impl StreamingResponse {
    /// Create a streaming response
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: ResponseStream) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Replace the body stream, keeping the head
    pub fn map_body<F>(self, f: F) -> Self
    where
        F: FnOnce(ResponseStream) -> ResponseStream,
    {
        Self {
            body: f(self.body),
            ..self
        }
    }

    /// Drain the body and produce a buffered response
    pub async fn buffer(mut self, requested: &Url, start: Instant) -> Result<Response> {
        let mut body = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            body.extend_from_slice(&chunk?);
        }

        Ok(Response::new(
            self.status,
            self.headers,
            body.freeze(),
            self.url.clone(),
            &self.url != requested,
            start.elapsed().as_millis() as u64,
        ))
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether this was a redirect
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status() {
        let resp = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::new(),
            Url::parse("https://example.com").unwrap(),
            false,
            100,
        );
        assert!(resp.is_success());
        assert_eq!(resp.status_code(), 200);
    }

    #[tokio::test]
    async fn test_buffer_concatenates_chunks() {
        let url = Url::parse("https://example.com/a").unwrap();
        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from("Hello, ")), Ok(Bytes::from("World!"))];
        let streaming = StreamingResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            url.clone(),
            Box::pin(futures::stream::iter(chunks)),
        );

        let resp = streaming.buffer(&url, Instant::now()).await.unwrap();
        assert_eq!(resp.text().unwrap(), "Hello, World!");
        assert!(!resp.redirected);
    }

    #[tokio::test]
    async fn test_buffer_propagates_chunk_error() {
        let url = Url::parse("https://example.com/a").unwrap();
        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from("partial")), Err(Error::network("reset"))];
        let streaming = StreamingResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            url.clone(),
            Box::pin(futures::stream::iter(chunks)),
        );

        let err = streaming.buffer(&url, Instant::now()).await.unwrap_err();
        assert!(err.is_network());
    }
}
