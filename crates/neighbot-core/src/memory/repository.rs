//! ContextRepository trait and its boxed wrapper.
//!
//! Each context is persisted as two independent documents: its metadata and
//! filter configuration, and its message log. There is no multi-document
//! transaction; a crash between the two writes leaves the previous version of
//! whichever document was not rewritten.

use std::future::Future;
use std::pin::Pin;

use neighbot_types::context::Context;
use neighbot_types::error::StoreError;
use neighbot_types::message::Message;

/// Persistence backend for contexts.
pub trait ContextRepository: Send + Sync {
    /// Write a context's metadata and filter configuration.
    fn save_config(
        &self,
        context: &Context,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Write a context's full message log.
    fn save_memory(
        &self,
        context_id: &str,
        messages: &[Message],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Load every persisted context, messages included.
    ///
    /// Locations without a configuration document are skipped.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Context>, StoreError>> + Send;

    /// Write default documents wherever a context location lacks one.
    ///
    /// Returns the number of documents written.
    fn populate_missing(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// Object-safe version of [`ContextRepository`] with boxed futures.
pub trait ContextRepositoryDyn: Send + Sync {
    fn save_config_boxed<'a>(
        &'a self,
        context: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn save_memory_boxed<'a>(
        &'a self,
        context_id: &'a str,
        messages: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn load_all_boxed(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Context>, StoreError>> + Send + '_>>;

    fn populate_missing_boxed(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>>;
}

impl<T: ContextRepository> ContextRepositoryDyn for T {
    fn save_config_boxed<'a>(
        &'a self,
        context: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.save_config(context))
    }

    fn save_memory_boxed<'a>(
        &'a self,
        context_id: &'a str,
        messages: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.save_memory(context_id, messages))
    }

    fn load_all_boxed(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Context>, StoreError>> + Send + '_>> {
        Box::pin(self.load_all())
    }

    fn populate_missing_boxed(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>> {
        Box::pin(self.populate_missing())
    }
}

/// Type-erased context repository, so the memory store is not generic.
pub struct BoxContextRepository {
    inner: Box<dyn ContextRepositoryDyn + Send + Sync>,
}

impl BoxContextRepository {
    pub fn new<T: ContextRepository + 'static>(repository: T) -> Self {
        Self {
            inner: Box::new(repository),
        }
    }

    pub async fn save_config(&self, context: &Context) -> Result<(), StoreError> {
        self.inner.save_config_boxed(context).await
    }

    pub async fn save_memory(
        &self,
        context_id: &str,
        messages: &[Message],
    ) -> Result<(), StoreError> {
        self.inner.save_memory_boxed(context_id, messages).await
    }

    pub async fn load_all(&self) -> Result<Vec<Context>, StoreError> {
        self.inner.load_all_boxed().await
    }

    pub async fn populate_missing(&self) -> Result<usize, StoreError> {
        self.inner.populate_missing_boxed().await
    }
}
