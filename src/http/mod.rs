// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer
//!
//! A thin client over a pluggable [`Transport`]. The real transport is
//! reqwest; interception hooks are transports layered on top of it.

mod client;
mod request;
mod response;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpClient, RequestBuilder};
pub use request::{Body, ByteStream, Request};
pub use response::{Response, ResponseStream, StreamingResponse};
pub use transport::{HttpClientConfig, ReqwestTransport, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("netlens/", env!("CARGO_PKG_VERSION"));
