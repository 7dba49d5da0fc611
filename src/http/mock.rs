// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory transport for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use url::Url;

use super::request::{Body, Request};
use super::response::StreamingResponse;
use super::transport::Transport;
use crate::error::{Error, Result};

/// What the mock transport saw
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub body_error: bool,
}

enum Reply {
    Ok {
        status: u16,
        chunks: Vec<Bytes>,
        fail_after_chunks: Option<String>,
    },
    Fail(String),
    Hang,
}

/// Transport that answers every request with a canned reply
pub struct MockTransport {
    reply: Reply,
    calls: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

impl MockTransport {
    pub fn ok(status: u16, chunks: &[&str]) -> Self {
        Self::with_reply(Reply::Ok {
            status,
            chunks: chunks.iter().map(|c| Bytes::from(c.to_string())).collect(),
            fail_after_chunks: None,
        })
    }

    pub fn broken_body(status: u16, chunks: &[&str], error: &str) -> Self {
        Self::with_reply(Reply::Ok {
            status,
            chunks: chunks.iter().map(|c| Bytes::from(c.to_string())).collect(),
            fail_after_chunks: Some(error.to_string()),
        })
    }

    pub fn failing(error: &str) -> Self {
        Self::with_reply(Reply::Fail(error.to_string()))
    }

    pub fn hanging() -> Self {
        Self::with_reply(Reply::Hang)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.seen.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<StreamingResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (body, body_error) = match request.body {
            None => (None, false),
            Some(Body::Bytes(bytes)) => (Some(bytes.to_vec()), false),
            Some(Body::Stream(mut stream)) => {
                let mut buf = BytesMut::new();
                let mut failed = false;
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(chunk) => buf.extend_from_slice(&chunk),
                        Err(_) => failed = true,
                    }
                }
                (Some(buf.to_vec()), failed)
            }
        };
        self.seen.lock().push(SeenRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body,
            body_error,
        });

        match &self.reply {
            Reply::Ok {
                status,
                chunks,
                fail_after_chunks,
            } => {
                let mut items: Vec<Result<Bytes>> = chunks.iter().cloned().map(Ok).collect();
                if let Some(message) = fail_after_chunks {
                    items.push(Err(Error::network(message.clone())));
                }
                let mut headers = HeaderMap::new();
                headers.insert("content-type", HeaderValue::from_static("text/plain"));
                Ok(StreamingResponse::new(
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::OK),
                    headers,
                    request.url,
                    Box::pin(futures::stream::iter(items)),
                ))
            }
            Reply::Fail(message) => Err(Error::network(message.clone())),
            Reply::Hang => futures::future::pending().await,
        }
    }
}
