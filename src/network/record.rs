// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Log record types

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

use bytes::Bytes;
use chrono::{DateTime, Local, Utc};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::Request;

/// Separator closing every exported record
pub const RECORD_SEPARATOR: &str = "==========================================";

/// Unique record identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Kind of traffic a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Http,
    Https,
    Tcp,
    Udp,
    SocketEvent,
}

impl LogKind {
    /// Derive the kind from a URL scheme
    pub fn from_url(url: &str) -> Self {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "https" => LogKind::Https,
            "http" => LogKind::Http,
            "ws" | "wss" => LogKind::SocketEvent,
            "tcp" => LogKind::Tcp,
            "udp" => LogKind::Udp,
            _ => LogKind::Http,
        }
    }

    /// Label used in text exports
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Http => "HTTP",
            LogKind::Https => "HTTPS",
            LogKind::Tcp => "TCP",
            LogKind::Udp => "UDP",
            LogKind::SocketEvent => "SOCKET_EVENT",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard HTTP verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// Verb name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl From<&Method> for HttpMethod {
    /// Non-standard verbs are recorded as GET
    fn from(method: &Method) -> Self {
        const VERBS: [(Method, HttpMethod); 8] = [
            (Method::POST, HttpMethod::Post),
            (Method::PUT, HttpMethod::Put),
            (Method::DELETE, HttpMethod::Delete),
            (Method::PATCH, HttpMethod::Patch),
            (Method::HEAD, HttpMethod::Head),
            (Method::OPTIONS, HttpMethod::Options),
            (Method::TRACE, HttpMethod::Trace),
            (Method::CONNECT, HttpMethod::Connect),
        ];

        VERBS
            .iter()
            .find(|(verb, _)| verb == method)
            .map_or(HttpMethod::Get, |(_, mapped)| *mapped)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed exchange or socket event
///
/// Identity fields (`id`, `kind`, `url`, `method`, `start_time`) are fixed at
/// construction. Outcome fields are filled in as the response arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    id: RecordId,
    kind: LogKind,
    url: String,
    method: Option<HttpMethod>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    /// Request headers
    pub request_headers: HashMap<String, String>,
    /// Captured request body
    pub request_body: Option<Bytes>,
    /// Status code (or synthesized event code)
    pub status_code: Option<u16>,
    /// Response headers
    pub response_headers: HashMap<String, String>,
    /// Captured response body
    pub response_body: Option<Bytes>,
    /// Failure description
    pub error: Option<String>,
    /// Transport-specific details
    pub extra_info: Option<String>,
}

impl LogRecord {
    /// Create an open record starting now
    pub fn new(kind: LogKind, url: impl Into<String>, method: Option<HttpMethod>) -> Self {
        Self {
            id: RecordId::new(),
            kind,
            url: url.into(),
            method,
            start_time: Utc::now(),
            end_time: None,
            request_headers: HashMap::new(),
            request_body: None,
            status_code: None,
            response_headers: HashMap::new(),
            response_body: None,
            error: None,
            extra_info: None,
        }
    }

    /// Build an open record describing an outbound request
    pub fn from_request(request: &Request, body: Option<Bytes>) -> Self {
        let url = request.url.to_string();
        let mut record = Self::new(
            LogKind::from_url(&url),
            url,
            Some(HttpMethod::from(&request.method)),
        );
        record.request_headers = header_map_to_strings(&request.headers);
        record.request_body = body;
        record
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Close the record now. Never earlier than `start_time`.
    pub fn finish(&mut self) {
        self.finish_at(Utc::now());
    }

    /// Close the record at a given instant, clamped to `start_time`
    pub fn finish_at(&mut self, at: DateTime<Utc>) {
        self.end_time = Some(at.max(self.start_time));
    }

    /// Whether the record has been closed
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Elapsed milliseconds between start and end, if closed
    pub fn duration_ms(&self) -> Option<u64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds().max(0) as u64)
    }

    /// Status code in 200..=299
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(200..=299))
    }

    /// Size of the captured response body
    pub fn response_size(&self) -> usize {
        self.response_body.as_ref().map_or(0, Bytes::len)
    }

    /// Request body as UTF-8 text, or a hex dump
    pub fn request_body_text(&self) -> Option<String> {
        self.request_body.as_deref().map(body_text)
    }

    /// Response body as UTF-8 text, or a hex dump
    pub fn response_body_text(&self) -> Option<String> {
        self.response_body.as_deref().map(body_text)
    }

    /// Case-insensitive keyword match over url, method and bodies
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        let contains = |s: &str| s.to_lowercase().contains(&keyword);

        contains(&self.url)
            || self.method.map_or(false, |m| contains(m.as_str()))
            || self.request_body_text().map_or(false, |b| contains(&b))
            || self.response_body_text().map_or(false, |b| contains(&b))
    }

    /// Human-readable export of this record
    pub fn to_log_text(&self) -> String {
        let mut text = String::new();
        let heading = match self.kind {
            LogKind::SocketEvent => "Event",
            _ => "Request",
        };

        let _ = writeln!(text, "========== {} {} ==========", self.kind, heading);
        let _ = writeln!(text, "ID: {}", self.id);
        let _ = writeln!(text, "URL: {}", self.url);
        if let Some(method) = self.method {
            let _ = writeln!(text, "Method: {}", method);
        }
        let _ = writeln!(text, "Start Time: {}", format_time(self.start_time));
        if let Some(end) = self.end_time {
            let _ = writeln!(text, "End Time: {}", format_time(end));
        }
        if let Some(duration) = self.duration_ms() {
            let _ = writeln!(text, "Duration: {}ms", duration);
        }
        if let Some(status) = self.status_code {
            let _ = writeln!(text, "Status Code: {}", status);
        }
        if let Some(ref error) = self.error {
            let _ = writeln!(text, "Error: {}", error);
        }

        write_headers(&mut text, "Request Headers", &self.request_headers);
        if let Some(body) = self.request_body_text() {
            let _ = write!(text, "\n--- Request Body ---\n{}\n", body);
        }
        write_headers(&mut text, "Response Headers", &self.response_headers);
        if let Some(body) = self.response_body_text() {
            let _ = write!(text, "\n--- Response Body ---\n{}\n", body);
        }
        if let Some(ref info) = self.extra_info {
            let _ = write!(text, "\n--- Extra Info ---\n{}\n", info);
        }

        text.push_str(RECORD_SEPARATOR);
        text.push('\n');
        text
    }
}

/// Flatten a header map; repeated headers are joined with ", "
pub fn header_map_to_strings(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

/// UTF-8 text when decodable, otherwise space-separated hex bytes
pub fn body_text(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => body
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn write_headers(text: &mut String, title: &str, headers: &HashMap<String, String>) {
    if headers.is_empty() {
        return;
    }
    let _ = write!(text, "\n--- {} ---\n", title);
    let mut sorted: Vec<_> = headers.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in sorted {
        let _ = writeln!(text, "{}: {}", key, value);
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}
