//! Background catalog loading with cancellation.
//!
//! A load runs on its own tokio task so the page stays responsive while it is
//! pending. The page keeps a [`CancelHandle`]; once cancelled (for example on
//! teardown) a result that arrives later is discarded instead of applied.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{Catalog, CatalogClient};

/// Message shown when the load task itself fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load products. Please try again.";

/// Shared cancellation flag for a pending load.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Mark the load as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`CancelHandle::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a load ended.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The catalog (remote or fallback) is ready to apply.
    Loaded(Catalog),
    /// The load task failed before producing a catalog.
    Failed(String),
    /// The load was cancelled; nothing should be applied.
    Cancelled,
}

/// A catalog fetch running on a background task.
///
/// Dropping the handle cancels the load and aborts the task.
#[derive(Debug)]
pub struct CatalogLoad {
    cancel: CancelHandle,
    task: Option<JoinHandle<Catalog>>,
}

impl CatalogLoad {
    /// Start fetching from `client`. Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(client: CatalogClient) -> Self {
        Self::spawn_with(async move { client.fetch_catalog().await })
    }

    /// Start a load driven by an arbitrary future.
    #[must_use]
    pub fn spawn_with<F>(fetch: F) -> Self
    where
        F: Future<Output = Catalog> + Send + 'static,
    {
        Self {
            cancel: CancelHandle::default(),
            task: Some(tokio::spawn(fetch)),
        }
    }

    /// A handle that can cancel this load from elsewhere.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel the load.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the load to finish.
    ///
    /// Returns [`LoadOutcome::Cancelled`] if the load was cancelled at any
    /// point before the result is handed back, even if the fetch completed.
    pub async fn finish(mut self) -> LoadOutcome {
        let Some(task) = self.task.take() else {
            return LoadOutcome::Cancelled;
        };

        let result = task.await;

        if self.cancel.is_cancelled() {
            debug!("Discarding catalog that arrived after cancellation");
            return LoadOutcome::Cancelled;
        }

        match result {
            Ok(catalog) => LoadOutcome::Loaded(catalog),
            Err(e) => {
                error!(error = %e, "Catalog load task failed");
                LoadOutcome::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        }
    }
}

impl Drop for CatalogLoad {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.cancel.cancel();
            task.abort();
        }
    }
}
