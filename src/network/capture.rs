// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Body capture with size limits

use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use crate::error::Result;
use crate::http::{Body, Request};

/// Accumulates body chunks up to a limit
///
/// Once the running size would exceed the limit the capture is abandoned and
/// [`BodyCapture::finish`] yields nothing; oversized bodies are omitted, never
/// truncated.
#[derive(Debug)]
pub struct BodyCapture {
    enabled: bool,
    limit: usize,
    buffer: Option<BytesMut>,
    overflowed: bool,
}

impl BodyCapture {
    /// Capture up to `limit` bytes. A limit of 0 means unlimited.
    pub fn new(limit: usize) -> Self {
        Self {
            enabled: true,
            limit,
            buffer: None,
            overflowed: false,
        }
    }

    /// A capture that ignores everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0)
        }
    }

    /// Feed one chunk
    pub fn push(&mut self, chunk: &[u8]) {
        if !self.enabled || self.overflowed {
            return;
        }
        let buffer = self.buffer.get_or_insert_with(BytesMut::new);
        if self.limit > 0 && buffer.len() + chunk.len() > self.limit {
            self.overflowed = true;
            self.buffer = None;
            return;
        }
        buffer.extend_from_slice(chunk);
    }

    /// Whether the limit was exceeded
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Captured bytes, or `None` if disabled, overflowed or nothing arrived
    pub fn finish(&mut self) -> Option<Bytes> {
        self.buffer.take().map(BytesMut::freeze)
    }
}

/// Copy of `body` if it fits `limit` (0 means unlimited)
pub fn capped(body: &[u8], limit: usize) -> Option<Bytes> {
    let mut capture = BodyCapture::new(limit);
    capture.push(body);
    capture.finish()
}

/// Take a copy of the request body without consuming it
///
/// A streamed body is drained into memory and replaced by a replay stream
/// that yields the same chunks (and the same error, if reading failed), so
/// the transport downstream sees exactly what it would have seen. The copy
/// is only returned when every chunk was read successfully and it fits the
/// limit.
pub async fn capture_request_body(request: &mut Request, limit: usize) -> Option<Bytes> {
    match request.body.take()? {
        Body::Bytes(bytes) => {
            let captured = capped(&bytes, limit);
            request.body = Some(Body::Bytes(bytes));
            captured
        }
        Body::Stream(stream) => {
            let chunks: Vec<Result<Bytes>> = stream.collect().await;
            let mut capture = BodyCapture::new(limit);
            let mut complete = true;
            for chunk in &chunks {
                match chunk {
                    Ok(chunk) => capture.push(chunk),
                    Err(e) => {
                        tracing::warn!(url = %request.url, error = %e, "Request body stream failed while capturing");
                        complete = false;
                    }
                }
            }
            request.body = Some(Body::wrap_stream(futures::stream::iter(chunks)));

            if !complete || capture.overflowed() {
                return None;
            }
            // An empty stream still counts as a captured (empty) body
            Some(capture.finish().unwrap_or_default())
        }
    }
}
