// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Logger configuration

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default record capacity
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Default body capture limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gates all admission
    pub enabled: bool,
    /// Store capacity, oldest records are evicted beyond it
    pub max_records: usize,
    /// URLs to observe (regex, substring fallback). Empty observes everything.
    pub allow_patterns: Vec<String>,
    /// URLs never to observe; checked before `allow_patterns`
    pub deny_patterns: Vec<String>,
    /// Capture request bodies
    pub capture_request_body: bool,
    /// Capture response bodies
    pub capture_response_body: bool,
    /// Bodies larger than this are omitted. 0 means unlimited.
    pub max_body_bytes: usize,
    /// Gates the socket event path
    pub event_log_enabled: bool,
    /// Echo every new record through `tracing`
    pub print_to_console: bool,
    /// Read by the overlay presenter only
    pub overlay_visible: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            max_records: DEFAULT_MAX_RECORDS,
            allow_patterns: Vec::new(),
            deny_patterns: Vec::new(),
            capture_request_body: true,
            capture_response_body: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            event_log_enabled: true,
            print_to_console: false,
            overlay_visible: true,
        }
    }
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check field constraints
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(Error::config("max_records must be greater than zero"));
        }
        Ok(())
    }

    /// Enable/disable observation
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set store capacity (at least 1)
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max.max(1);
        self
    }

    /// Add an allow pattern
    pub fn allow_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.add_allow_pattern(pattern);
        self
    }

    /// Add a deny pattern
    pub fn deny_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.add_deny_pattern(pattern);
        self
    }

    /// Set body capture flags
    pub fn capture_bodies(mut self, request: bool, response: bool) -> Self {
        self.capture_request_body = request;
        self.capture_response_body = response;
        self
    }

    /// Set body size limit
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Enable/disable the socket event path
    pub fn event_log_enabled(mut self, enabled: bool) -> Self {
        self.event_log_enabled = enabled;
        self
    }

    /// Echo records to the console log
    pub fn print_to_console(mut self, print: bool) -> Self {
        self.print_to_console = print;
        self
    }

    /// Show/hide the overlay
    pub fn overlay_visible(mut self, visible: bool) -> Self {
        self.overlay_visible = visible;
        self
    }

    /// Append an allow pattern unless already present
    pub fn add_allow_pattern(&mut self, pattern: impl Into<String>) {
        push_unique(&mut self.allow_patterns, pattern.into());
    }

    /// Remove an allow pattern
    pub fn remove_allow_pattern(&mut self, pattern: &str) {
        self.allow_patterns.retain(|p| p != pattern);
    }

    /// Append a deny pattern unless already present
    pub fn add_deny_pattern(&mut self, pattern: impl Into<String>) {
        push_unique(&mut self.deny_patterns, pattern.into());
    }

    /// Remove a deny pattern
    pub fn remove_deny_pattern(&mut self, pattern: &str) {
        self.deny_patterns.retain(|p| p != pattern);
    }

    /// Restore every field to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn push_unique(patterns: &mut Vec<String>, pattern: String) {
    if !patterns.contains(&pattern) {
        patterns.push(pattern);
    }
}

/// Shared handle to the process-wide configuration
///
/// Cloning the handle shares the same underlying config. Readers take
/// snapshots; writers go through [`ConfigHandle::update`].
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Config>>,
}

impl ConfigHandle {
    /// Wrap a config
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current config
    pub fn snapshot(&self) -> Config {
        self.inner.read().clone()
    }

    /// Read a single value without cloning the whole config
    pub fn read<T>(&self, f: impl FnOnce(&Config) -> T) -> T {
        f(&*self.inner.read())
    }

    /// Mutate the config in place
    pub fn update<T>(&self, f: impl FnOnce(&mut Config) -> T) -> T {
        let mut config = self.inner.write();
        let out = f(&mut *config);
        config.max_records = config.max_records.max(1);
        out
    }

    /// Replace the whole config
    pub fn replace(&self, config: Config) {
        self.update(|c| *c = config);
    }
}
