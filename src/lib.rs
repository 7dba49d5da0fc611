// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Netlens - In-Process Network Traffic Logger
//!
//! Observes the outbound HTTP traffic of a host application, records every
//! exchange into a bounded store, and exposes the records for querying,
//! filtering and export.
//!
//! ## Features
//!
//! - Transparent interception: clients built through the logger are observed
//!   without changes at call sites
//! - Allow/deny URL patterns (regex, with substring fallback)
//! - Request and response body capture with a size limit
//! - Bounded store, newest first, with change notifications
//! - Socket event ingestion for persistent connections
//! - Text and JSON export, statistics
//!
//! ## Example
//!
//! ```rust,no_run
//! use netlens::{Config, NetLogger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let logger = NetLogger::new(Config::default().deny_pattern(r"\.(png|jpg)$"));
//!     logger.start();
//!
//!     let client = logger.client()?;
//!     client.get("https://example.com").await?;
//!
//!     for record in logger.store().get_all().await {
//!         println!("{} {} -> {:?}", record.kind(), record.url(), record.status_code);
//!     }
//!
//!     logger.stop();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod logger;
pub mod network;
pub mod store;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Request, Response, StreamingResponse, Transport};

// Logger
pub use logger::{Config, ConfigHandle, LifecycleState, NetLogger, OverlayPresenter};

// Network
pub use network::{HookRegistry, Interceptor, NetworkHook, PatternFilter};
pub use network::{HttpMethod, LogKind, LogRecord, RecordId};
pub use network::{EventRecorder, SocketEvent, SocketPayload};

// Store
pub use store::{Completion, LogStore, Statistics, StoreChanged};

/// Netlens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
