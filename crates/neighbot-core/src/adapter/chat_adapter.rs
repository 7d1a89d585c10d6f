//! ChatAdapter trait and its type-erased wrapper.

use std::future::Future;
use std::pin::Pin;

use neighbot_types::adapter::AdapterState;
use neighbot_types::error::AdapterError;

use super::config::AdapterConfig;

/// A pluggable integration with one external chat platform.
///
/// Lifecycle: `set_config` -> `initialize` -> `start` -> `stop`. Each step
/// fails with [`AdapterError::InvalidState`] when called out of order.
pub trait ChatAdapter: Send + Sync {
    /// Registry key and provenance tag for message sources.
    fn name(&self) -> &str;

    fn state(&self) -> AdapterState;

    /// Accept a configuration. Fails if it is not this adapter's config type.
    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError>;

    /// Validate configuration and prepare inbound handling. Opens no connection.
    fn initialize(&mut self) -> Result<(), AdapterError>;

    /// Open the live connection to the platform.
    fn start(&mut self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Close the connection.
    fn stop(&mut self) -> impl Future<Output = Result<(), AdapterError>> + Send;
}

/// Object-safe version of [`ChatAdapter`] with boxed futures.
pub trait ChatAdapterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> AdapterState;

    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError>;

    fn initialize(&mut self) -> Result<(), AdapterError>;

    fn start_boxed(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), AdapterError>> + Send + '_>>;

    fn stop_boxed(&mut self)
    -> Pin<Box<dyn Future<Output = Result<(), AdapterError>> + Send + '_>>;
}

impl<T: ChatAdapter> ChatAdapterDyn for T {
    fn name(&self) -> &str {
        ChatAdapter::name(self)
    }

    fn state(&self) -> AdapterState {
        ChatAdapter::state(self)
    }

    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError> {
        ChatAdapter::set_config(self, config)
    }

    fn initialize(&mut self) -> Result<(), AdapterError> {
        ChatAdapter::initialize(self)
    }

    fn start_boxed(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), AdapterError>> + Send + '_>> {
        Box::pin(self.start())
    }

    fn stop_boxed(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), AdapterError>> + Send + '_>> {
        Box::pin(self.stop())
    }
}

/// Type-erased chat adapter, as produced by the registry.
pub struct BoxChatAdapter {
    inner: Box<dyn ChatAdapterDyn + Send + Sync>,
}

impl BoxChatAdapter {
    pub fn new<T: ChatAdapter + 'static>(adapter: T) -> Self {
        Self {
            inner: Box::new(adapter),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn state(&self) -> AdapterState {
        self.inner.state()
    }

    pub fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError> {
        self.inner.set_config(config)
    }

    pub fn initialize(&mut self) -> Result<(), AdapterError> {
        self.inner.initialize()
    }

    pub async fn start(&mut self) -> Result<(), AdapterError> {
        self.inner.start_boxed().await
    }

    pub async fn stop(&mut self) -> Result<(), AdapterError> {
        self.inner.stop_boxed().await
    }
}
