// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event ingestion for persistent socket connections
//!
//! Socket traffic has no request/response pairing, so each event becomes one
//! record that is closed as soon as it is created. The status code carries
//! the event semantics: 101 for a connect, the close code for a disconnect,
//! 1000 when the peer closed, 200 for data frames and 0 for neutral events.

use std::collections::HashMap;

use bytes::Bytes;

use super::capture::capped;
use super::record::{LogKind, LogRecord, RecordId};
use crate::logger::ConfigHandle;
use crate::store::LogStore;

/// Status used for a completed handshake
pub const STATUS_SWITCHING_PROTOCOLS: u16 = 101;
/// Status used for data frames
pub const STATUS_DATA: u16 = 200;
/// Status used for neutral events
pub const STATUS_NEUTRAL: u16 = 0;
/// Normal closure code
pub const CLOSE_NORMAL: u16 = 1000;

/// Message payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketPayload {
    Text(String),
    Binary(Bytes),
}

impl SocketPayload {
    /// Payload bytes
    pub fn into_bytes(self) -> Bytes {
        match self {
            SocketPayload::Text(text) => Bytes::from(text),
            SocketPayload::Binary(data) => data,
        }
    }

    fn describe(&self) -> String {
        match self {
            SocketPayload::Text(text) => format!("text, {} chars", text.chars().count()),
            SocketPayload::Binary(data) => format!("binary, {} bytes", data.len()),
        }
    }
}

/// One discrete occurrence on a persistent connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake completed, with the server's headers
    Connected(HashMap<String, String>),
    /// Connection closed with a reason and close code
    Disconnected { reason: String, code: u16 },
    /// Message from the peer
    MessageReceived(SocketPayload),
    /// Message to the peer
    MessageSent(SocketPayload),
    Ping(Option<Bytes>),
    Pong(Option<Bytes>),
    /// Connection error
    Error(Option<String>),
    /// Network path became usable or unusable
    ViabilityChanged(bool),
    /// The client library suggests reconnecting
    ReconnectSuggested(bool),
    Cancelled,
    PeerClosed,
}

impl SocketEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SocketEvent::Connected(_) => "connected",
            SocketEvent::Disconnected { .. } => "disconnected",
            SocketEvent::MessageReceived(_) => "message_received",
            SocketEvent::MessageSent(_) => "message_sent",
            SocketEvent::Ping(_) => "ping",
            SocketEvent::Pong(_) => "pong",
            SocketEvent::Error(_) => "error",
            SocketEvent::ViabilityChanged(_) => "viability_changed",
            SocketEvent::ReconnectSuggested(_) => "reconnect_suggested",
            SocketEvent::Cancelled => "cancelled",
            SocketEvent::PeerClosed => "peer_closed",
        }
    }

    /// Build the closed record describing this event
    pub fn into_record(self, url: impl Into<String>) -> LogRecord {
        let mut record = LogRecord::new(LogKind::SocketEvent, url, None);

        let (status, info) = match self {
            SocketEvent::Connected(headers) => {
                record.response_headers = headers;
                (STATUS_SWITCHING_PROTOCOLS, "Connected".to_string())
            }
            SocketEvent::Disconnected { reason, code } => {
                let info = format!("Disconnected (code {}): {}", code, reason);
                if !reason.is_empty() {
                    record.error = Some(reason);
                }
                (code, info)
            }
            SocketEvent::MessageReceived(payload) => {
                let info = format!("Message received ({})", payload.describe());
                record.response_body = Some(payload.into_bytes());
                (STATUS_DATA, info)
            }
            SocketEvent::MessageSent(payload) => {
                let info = format!("Message sent ({})", payload.describe());
                record.request_body = Some(payload.into_bytes());
                (STATUS_DATA, info)
            }
            SocketEvent::Ping(data) => {
                let info = format!("Ping ({} bytes)", data.as_ref().map_or(0, Bytes::len));
                record.request_body = data;
                (STATUS_DATA, info)
            }
            SocketEvent::Pong(data) => {
                let info = format!("Pong ({} bytes)", data.as_ref().map_or(0, Bytes::len));
                record.request_body = data;
                (STATUS_DATA, info)
            }
            SocketEvent::Error(message) => {
                let message = message.unwrap_or_else(|| "Unknown error".to_string());
                let info = format!("Error: {}", message);
                record.error = Some(message);
                (STATUS_NEUTRAL, info)
            }
            SocketEvent::ViabilityChanged(viable) => (
                STATUS_NEUTRAL,
                format!("Viability changed: {}", if viable { "viable" } else { "not viable" }),
            ),
            SocketEvent::ReconnectSuggested(suggested) => {
                (STATUS_NEUTRAL, format!("Reconnect suggested: {}", suggested))
            }
            SocketEvent::Cancelled => {
                record.error = Some("Cancelled".to_string());
                (STATUS_NEUTRAL, "Cancelled".to_string())
            }
            SocketEvent::PeerClosed => (CLOSE_NORMAL, "Closed by peer".to_string()),
        };

        record.status_code = Some(status);
        record.extra_info = Some(info);
        record.finish();
        record
    }
}

/// Push-based entry point for socket events
#[derive(Clone)]
pub struct EventRecorder {
    config: ConfigHandle,
    store: LogStore,
}

impl EventRecorder {
    /// Create a recorder writing into `store`
    pub fn new(config: ConfigHandle, store: LogStore) -> Self {
        Self { config, store }
    }

    /// Record an event
    ///
    /// Returns the id of the new record, or `None` when the event log is
    /// disabled and the event was dropped. Payloads larger than
    /// `max_body_bytes` are omitted from the record.
    pub fn record(&self, url: &str, event: SocketEvent) -> Option<RecordId> {
        let (enabled, limit) = self.config.read(|c| (c.event_log_enabled, c.max_body_bytes));
        if !enabled {
            return None;
        }
        tracing::debug!(url, event = event.name(), "Socket event");
        let mut record = event.into_record(url);
        record.request_body = record.request_body.take().and_then(|body| capped(&body, limit));
        record.response_body = record.response_body.take().and_then(|body| capped(&body, limit));
        let id = record.id();
        self.store.insert(record);
        Some(id)
    }
}

#[cfg(feature = "websocket")]
mod tungstenite_support {
    use bytes::Bytes;
    use tokio_tungstenite::tungstenite::Message;

    use super::{SocketEvent, SocketPayload};

    impl From<Message> for SocketEvent {
        /// Incoming frame as seen by a reader
        fn from(message: Message) -> Self {
            match message {
                Message::Text(text) => SocketEvent::MessageReceived(SocketPayload::Text(text)),
                Message::Binary(data) => SocketEvent::MessageReceived(SocketPayload::Binary(Bytes::from(data))),
                Message::Ping(data) => SocketEvent::Ping(Some(Bytes::from(data))),
                Message::Pong(data) => SocketEvent::Pong(Some(Bytes::from(data))),
                Message::Close(Some(frame)) => SocketEvent::Disconnected {
                    reason: frame.reason.into_owned(),
                    code: u16::from(frame.code),
                },
                Message::Close(None) => SocketEvent::PeerClosed,
                Message::Frame(frame) => SocketEvent::MessageReceived(SocketPayload::Binary(
                    Bytes::copy_from_slice(frame.payload()),
                )),
            }
        }
    }

    impl SocketEvent {
        /// Outgoing frame as seen by a writer
        pub fn outgoing(message: Message) -> Self {
            match SocketEvent::from(message) {
                SocketEvent::MessageReceived(payload) => SocketEvent::MessageSent(payload),
                other => other,
            }
        }
    }

}
