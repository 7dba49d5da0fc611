// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL admission filter

use std::sync::Arc;

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};

use crate::logger::ConfigHandle;

/// Compiled form of a configured pattern
#[derive(Debug, Clone)]
enum Matcher {
    /// Valid regular expression, matched case-insensitively
    Regex(Regex),
    /// Pattern that failed to compile, matched by plain containment
    Substring(String),
}

impl Matcher {
    fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => Matcher::Regex(regex),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "Pattern is not a valid regex, using substring match");
                Matcher::Substring(pattern.to_string())
            }
        }
    }

    fn is_match(&self, url: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(url),
            Matcher::Substring(needle) => url.contains(needle.as_str()),
        }
    }
}

/// Decides whether a URL is observed, from the live config
///
/// Compiled patterns are cached across calls; the pattern lists themselves
/// are re-read on every call so config changes take effect immediately.
/// Cached patterns that left the config are dropped on the next call.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    config: ConfigHandle,
    compiled: Arc<DashMap<String, Matcher>>,
}

impl PatternFilter {
    /// Create a filter over the shared config
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            compiled: Arc::new(DashMap::new()),
        }
    }

    /// Admission decision for a URL
    ///
    /// Disabled config rejects everything. A deny match rejects regardless of
    /// the allow list. An empty allow list accepts everything not denied.
    pub fn should_observe(&self, url: &str) -> bool {
        let (enabled, allow, deny) = self.config.read(|c| {
            (c.enabled, c.allow_patterns.clone(), c.deny_patterns.clone())
        });
        if self.compiled.len() > allow.len() + deny.len() {
            self.compiled
                .retain(|pattern, _| allow.contains(pattern) || deny.contains(pattern));
        }

        if !enabled {
            return false;
        }
        if self.matches_any(url, &deny) {
            return false;
        }
        if allow.is_empty() {
            return true;
        }
        self.matches_any(url, &allow)
    }

    /// Whether `url` matches at least one pattern
    pub fn matches_any(&self, url: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| self.matches(url, pattern))
    }

    fn matches(&self, url: &str, pattern: &str) -> bool {
        if let Some(matcher) = self.compiled.get(pattern) {
            return matcher.is_match(url);
        }
        let matcher = Matcher::compile(pattern);
        let hit = matcher.is_match(url);
        self.compiled.insert(pattern.to_string(), matcher);
        hit
    }
}
