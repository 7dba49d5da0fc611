// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interceptor that records every admitted request

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{ready, Stream};

use super::capture::{capture_request_body, BodyCapture};
use super::filter::PatternFilter;
use super::hook::{NetworkHook, HANDLED_PROPERTY};
use super::record::{header_map_to_strings, LogRecord};
use crate::error::{Error, Result};
use crate::http::{Request, ResponseStream, StreamingResponse, Transport};
use crate::logger::ConfigHandle;
use crate::store::LogStore;

/// Records admitted requests into the store
///
/// A request is admitted when the interceptor is active, the request does
/// not carry [`HANDLED_PROPERTY`] and the pattern filter accepts its URL.
/// Admitted requests get an open record as soon as they are sent; the record
/// is closed when the response body ends, the transport fails, or the call
/// is dropped before completing. The caller always receives the transport's
/// own result.
pub struct Interceptor {
    config: ConfigHandle,
    filter: PatternFilter,
    store: LogStore,
    active: AtomicBool,
}

impl Interceptor {
    /// Create an inactive interceptor
    pub fn new(config: ConfigHandle, store: LogStore) -> Self {
        Self {
            filter: PatternFilter::new(config.clone()),
            config,
            store,
            active: AtomicBool::new(false),
        }
    }

    /// Whether the interceptor is admitting requests
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The admission filter
    pub fn filter(&self) -> &PatternFilter {
        &self.filter
    }

    pub(crate) fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkHook for Interceptor {
    fn can_handle(&self, request: &Request) -> bool {
        if !self.is_active() || request.has_property(HANDLED_PROPERTY) {
            return false;
        }
        let admitted = self.filter.should_observe(request.url_str());
        if !admitted {
            tracing::debug!(url = %request.url, "Request not admitted");
        }
        admitted
    }

    async fn handle(&self, mut request: Request, next: &dyn Transport) -> Result<StreamingResponse> {
        let (capture_request, capture_response, limit) = self.config.read(|c| {
            (c.capture_request_body, c.capture_response_body, c.max_body_bytes)
        });

        let body = if capture_request {
            capture_request_body(&mut request, limit).await
        } else {
            None
        };

        let record = LogRecord::from_request(&request, body);
        tracing::debug!(id = %record.id(), method = %request.method, url = %request.url, "Intercepting request");
        self.store.insert(record.clone());
        let mut pending = PendingRecord::new(record, self.store.clone());

        request.set_property(HANDLED_PROPERTY);
        match next.send(request).await {
            Ok(response) => {
                pending.record.status_code = Some(response.status.as_u16());
                pending.record.response_headers = header_map_to_strings(&response.headers);
                self.store.update(pending.record.clone());

                let capture = if capture_response {
                    BodyCapture::new(limit)
                } else {
                    BodyCapture::disabled()
                };
                Ok(response.map_body(move |inner| {
                    let tapped: ResponseStream = Box::pin(TapBody {
                        inner,
                        capture,
                        pending: Some(pending),
                    });
                    tapped
                }))
            }
            Err(e) => {
                pending.fail(&e);
                Err(e)
            }
        }
    }
}

/// Open record that closes itself
///
/// Dropping it before [`PendingRecord::close`] closes the record as
/// cancelled, so no record is left open by a dropped call.
struct PendingRecord {
    record: LogRecord,
    store: LogStore,
    closed: bool,
}

impl PendingRecord {
    fn new(record: LogRecord, store: LogStore) -> Self {
        Self {
            record,
            store,
            closed: false,
        }
    }

    fn close(&mut self) {
        self.record.finish();
        self.closed = true;
        tracing::debug!(
            id = %self.record.id(),
            status = ?self.record.status_code,
            duration_ms = ?self.record.duration_ms(),
            "Record closed"
        );
        self.store.update(self.record.clone());
    }

    fn fail(&mut self, error: &Error) {
        self.record.error = Some(error.to_string());
        self.close();
    }
}

impl Drop for PendingRecord {
    fn drop(&mut self) {
        if !self.closed {
            self.fail(&Error::Cancelled);
        }
    }
}

/// Response body wrapper feeding the body capture
struct TapBody {
    inner: ResponseStream,
    capture: BodyCapture,
    pending: Option<PendingRecord>,
}

impl Stream for TapBody {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = ready!(this.inner.as_mut().poll_next(cx));

        match &item {
            Some(Ok(chunk)) => this.capture.push(chunk),
            Some(Err(e)) => {
                if let Some(mut pending) = this.pending.take() {
                    pending.fail(e);
                }
            }
            None => {
                if let Some(mut pending) = this.pending.take() {
                    pending.record.response_body = this.capture.finish();
                    pending.close();
                }
            }
        }
        Poll::Ready(item)
    }
}
