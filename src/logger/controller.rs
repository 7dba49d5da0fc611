// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Lifecycle controller

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::config::{Config, ConfigHandle};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, Transport};
use crate::network::{EventRecorder, HookRegistry, Interceptor, RecordId, SocketEvent};
use crate::store::{Completion, LogStore, Statistics, StoreChanged};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
}

/// Presentation collaborator whose visibility follows the logger
pub trait OverlayPresenter: Send + Sync {
    /// Show or hide the overlay
    fn set_visible(&self, visible: bool);
}

/// Network logger
///
/// Owns the shared config, the record store and the interceptor. Host code
/// builds its HTTP clients through [`NetLogger::client`] (or the
/// [`HookRegistry`] returned by [`NetLogger::registry`]); while the logger
/// is running, those clients are observed.
///
/// # Example
///
/// ```rust,no_run
/// use netlens::{Config, NetLogger};
///
/// # async fn run() -> netlens::Result<()> {
/// let logger = NetLogger::new(Config::default().deny_pattern(r"\.png$"));
/// logger.start();
///
/// let client = logger.client()?;
/// client.get("https://example.com").await?;
///
/// println!("{}", logger.export_logs().await);
/// logger.stop();
/// # Ok(())
/// # }
/// ```
pub struct NetLogger {
    config: ConfigHandle,
    store: LogStore,
    registry: HookRegistry,
    interceptor: Arc<Interceptor>,
    recorder: EventRecorder,
    overlay: Option<Arc<dyn OverlayPresenter>>,
    state: Mutex<LifecycleState>,
}

impl NetLogger {
    /// Create a stopped logger. Must be called within a Tokio runtime.
    pub fn new(config: Config) -> Self {
        let config = ConfigHandle::new(config);
        let store = LogStore::new(config.clone());
        let interceptor = Arc::new(Interceptor::new(config.clone(), store.clone()));
        let recorder = EventRecorder::new(config.clone(), store.clone());

        Self {
            config,
            store,
            registry: HookRegistry::new(),
            interceptor,
            recorder,
            overlay: None,
            state: Mutex::new(LifecycleState::Stopped),
        }
    }

    /// Attach an overlay presenter
    pub fn with_overlay(mut self, overlay: Arc<dyn OverlayPresenter>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Start observing
    pub fn start(&self) {
        self.start_with(|_| {});
    }

    /// Apply `configure` to the config, then start observing
    ///
    /// When already running only the configuration is applied.
    pub fn start_with<F>(&self, configure: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut state = self.state.lock();
        self.config.update(configure);

        if *state == LifecycleState::Stopped {
            self.interceptor.activate();
            self.registry.install(self.interceptor.clone());
            *state = LifecycleState::Running;
            tracing::info!("Network logging started");
        }
        self.refresh_overlay(*state);
    }

    /// Stop observing. No-op when already stopped.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state == LifecycleState::Stopped {
            return;
        }

        self.interceptor.deactivate();
        self.registry.uninstall();
        *state = LifecycleState::Stopped;
        tracing::info!("Network logging stopped");
        self.refresh_overlay(*state);
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Client with default configuration, observed while running
    pub fn client(&self) -> Result<HttpClient> {
        self.registry.client()
    }

    /// Client with custom configuration, observed while running
    pub fn client_with_config(&self, config: &HttpClientConfig) -> Result<HttpClient> {
        self.registry.client_with_config(config)
    }

    /// Client on top of an existing transport, observed while running
    pub fn wrap(&self, transport: Arc<dyn Transport>) -> HttpClient {
        self.registry.wrap(transport)
    }

    /// The client factory
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// The record store
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// The shared configuration
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Subscribe to store change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.store.subscribe()
    }

    /// Remove every record
    pub fn clear(&self) -> Completion {
        self.store.clear()
    }

    pub fn add_allow_pattern(&self, pattern: impl Into<String>) {
        self.config.update(|c| c.add_allow_pattern(pattern));
    }

    pub fn add_deny_pattern(&self, pattern: impl Into<String>) {
        self.config.update(|c| c.add_deny_pattern(pattern));
    }

    /// Enable or disable admission of new requests
    pub fn set_enabled(&self, enabled: bool) {
        self.config.update(|c| c.enabled = enabled);
    }

    /// Enable or disable the socket event path
    pub fn set_event_log_enabled(&self, enabled: bool) {
        self.config.update(|c| c.event_log_enabled = enabled);
    }

    /// Record a socket event
    pub fn log_socket_event(&self, url: &str, event: SocketEvent) -> Option<RecordId> {
        self.recorder.record(url, event)
    }

    /// Text export of every record
    pub async fn export_logs(&self) -> String {
        self.store.export_as_text(None).await
    }

    /// Store statistics
    pub async fn statistics(&self) -> Statistics {
        self.store.statistics().await
    }

    fn refresh_overlay(&self, state: LifecycleState) {
        if let Some(ref overlay) = self.overlay {
            let visible = state == LifecycleState::Running && self.config.read(|c| c.overlay_visible);
            overlay.set_visible(visible);
        }
    }
}

impl Drop for NetLogger {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;

    #[derive(Default)]
    struct RecordingOverlay {
        calls: Mutex<Vec<bool>>,
    }

    impl OverlayPresenter for RecordingOverlay {
        fn set_visible(&self, visible: bool) {
            self.calls.lock().push(visible);
        }
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let logger = NetLogger::new(Config::default());
        assert_eq!(logger.state(), LifecycleState::Stopped);

        logger.stop();
        logger.start();
        logger.start_with(|c| c.max_records = 5);
        assert!(logger.is_running());
        assert!(logger.registry().is_installed());
        assert_eq!(logger.config().read(|c| c.max_records), 5);

        logger.stop();
        logger.stop();
        assert_eq!(logger.state(), LifecycleState::Stopped);
        assert!(!logger.registry().is_installed());
    }

    #[tokio::test]
    async fn test_records_only_while_running() {
        let logger = NetLogger::new(Config::default());
        let mock = Arc::new(MockTransport::ok(200, &["ok"]));

        logger.wrap(mock.clone()).get("http://a.test/before").await.unwrap();

        logger.start();
        let client = logger.wrap(mock.clone());
        client.get("http://a.test/during").await.unwrap();

        logger.stop();
        client.get("http://a.test/after").await.unwrap();

        let records = logger.store().get_all().await;
        assert_eq!(mock.calls(), 3);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url(), "http://a.test/during");
    }

    #[tokio::test]
    async fn test_control_surface() {
        let logger = NetLogger::new(Config::default());
        logger.start();
        let mock = Arc::new(MockTransport::ok(200, &[]));
        let client = logger.wrap(mock.clone());

        logger.add_deny_pattern("private");
        client.get("http://a.test/private").await.unwrap();
        logger.add_allow_pattern("api");
        client.get("http://a.test/home").await.unwrap();
        client.get("http://a.test/api").await.unwrap();
        logger.set_enabled(false);
        client.get("http://a.test/api/2").await.unwrap();

        let stats = logger.statistics().await;
        assert_eq!(stats.total, 1);

        logger.clear().await;
        assert_eq!(logger.store().count().await, 0);
    }

    #[tokio::test]
    async fn test_socket_events() {
        let logger = NetLogger::new(Config::default());
        let mut changes = logger.subscribe();

        let id = logger.log_socket_event("wss://a.test/ws", SocketEvent::PeerClosed);
        assert!(id.is_some());
        changes.recv().await.unwrap();

        logger.set_event_log_enabled(false);
        assert_eq!(logger.log_socket_event("wss://a.test/ws", SocketEvent::PeerClosed), None);

        let export = logger.export_logs().await;
        assert!(export.contains("Total Records: 1"));
        assert!(export.contains("SOCKET_EVENT Event"));
    }

    #[tokio::test]
    async fn test_overlay_follows_lifecycle() {
        let overlay = Arc::new(RecordingOverlay::default());
        let logger = NetLogger::new(Config::default()).with_overlay(overlay.clone());

        logger.start();
        logger.start_with(|c| c.overlay_visible = false);
        logger.stop();

        assert_eq!(*overlay.calls.lock(), vec![true, false, false]);
    }
}
