// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Hook point in the outbound request path
//!
//! Host code builds its clients through a [`HookRegistry`]. While a hook is
//! installed, every client the registry builds sends through a
//! [`HookedTransport`] that offers each request to the hook first.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, Request, ReqwestTransport, StreamingResponse, Transport};

/// Request property set on requests a hook has already handled
pub const HANDLED_PROPERTY: &str = "netlens.handled";

/// Something that observes or handles outbound requests
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use netlens::error::Result;
/// use netlens::http::{Request, StreamingResponse, Transport};
/// use netlens::network::{NetworkHook, HANDLED_PROPERTY};
///
/// struct Tracer;
///
/// #[async_trait]
/// impl NetworkHook for Tracer {
///     fn can_handle(&self, request: &Request) -> bool {
///         !request.has_property(HANDLED_PROPERTY)
///     }
///
///     async fn handle(&self, mut request: Request, next: &dyn Transport) -> Result<StreamingResponse> {
///         println!("{} {}", request.method, request.url);
///         request.set_property(HANDLED_PROPERTY);
///         next.send(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait NetworkHook: Send + Sync {
    /// Whether this hook wants the request
    fn can_handle(&self, request: &Request) -> bool;

    /// Handle the request
    ///
    /// `next` is the hooked transport itself, so whatever the hook sends
    /// through it is offered to the hook again. Implementations mark forwarded
    /// requests so that `can_handle` turns them down.
    async fn handle(&self, request: Request, next: &dyn Transport) -> Result<StreamingResponse>;
}

/// Transport that offers every request to a hook before the inner transport
pub struct HookedTransport {
    hook: Arc<dyn NetworkHook>,
    inner: Arc<dyn Transport>,
}

impl HookedTransport {
    /// Layer `hook` on top of `inner`
    pub fn new(hook: Arc<dyn NetworkHook>, inner: Arc<dyn Transport>) -> Self {
        Self { hook, inner }
    }
}

#[async_trait]
impl Transport for HookedTransport {
    async fn send(&self, request: Request) -> Result<StreamingResponse> {
        if self.hook.can_handle(&request) {
            self.hook.handle(request, self).await
        } else {
            tracing::trace!(url = %request.url, "Passing request through");
            self.inner.send(request).await
        }
    }
}

/// Factory for hooked HTTP clients
///
/// Clients built while a hook is installed route through it; clients built
/// while none is installed are plain. Only the lifecycle controller installs
/// and removes hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    slot: Arc<RwLock<Option<Arc<dyn NetworkHook>>>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a hook is currently installed
    pub fn is_installed(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Build a client with default configuration
    pub fn client(&self) -> Result<HttpClient> {
        self.client_with_config(&HttpClientConfig::default())
    }

    /// Build a client with custom configuration
    pub fn client_with_config(&self, config: &HttpClientConfig) -> Result<HttpClient> {
        Ok(self.wrap(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Build a client on top of an existing transport
    pub fn wrap(&self, transport: Arc<dyn Transport>) -> HttpClient {
        match self.slot.read().as_ref() {
            Some(hook) => HttpClient::from_transport(Arc::new(HookedTransport::new(
                Arc::clone(hook),
                transport,
            ))),
            None => HttpClient::from_transport(transport),
        }
    }

    pub(crate) fn install(&self, hook: Arc<dyn NetworkHook>) {
        *self.slot.write() = Some(hook);
    }

    /// Empty the slot, returning whatever was installed
    pub(crate) fn uninstall(&self) -> Option<Arc<dyn NetworkHook>> {
        self.slot.write().take()
    }
}
