// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception and monitoring
//!
//! Observes outbound requests made through hooked clients and socket events
//! pushed by host code, turning each into a [`LogRecord`].

mod capture;
mod filter;
mod hook;
mod interceptor;
mod record;
mod socket;

pub use capture::{capped, capture_request_body, BodyCapture};
pub use filter::PatternFilter;
pub use hook::{HookRegistry, HookedTransport, NetworkHook, HANDLED_PROPERTY};
pub use interceptor::Interceptor;
pub use record::{
    body_text, header_map_to_strings, HttpMethod, LogKind, LogRecord, RecordId, RECORD_SEPARATOR,
};
pub use socket::{
    EventRecorder, SocketEvent, SocketPayload, CLOSE_NORMAL, STATUS_DATA, STATUS_NEUTRAL,
    STATUS_SWITCHING_PROTOCOLS,
};
