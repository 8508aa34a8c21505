//! History provider trait definition.

use async_trait::async_trait;

use crate::errors::HistoryError;
use crate::models::{ConcreteRequest, Observation};

/// Executes planned requests against a history store.
///
/// Implement this trait to plug in a data source (local files, a cache,
/// a vendor API). The planner has already validated and defaulted every
/// request; providers only retrieve.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quantlab_history::provider::HistoryProvider;
///
/// struct DiskProvider {
///     root: std::path::PathBuf,
/// }
///
/// #[async_trait]
/// impl HistoryProvider for DiskProvider {
///     fn id(&self) -> &'static str {
///         "LOCAL_DISK"
///     }
///
///     async fn fetch(
///         &self,
///         requests: &[ConcreteRequest],
///     ) -> Result<Vec<Observation>, HistoryError> {
///         // ... read and decode files for each request
///     }
/// }
/// ```
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Unique identifier used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch observations for a batch of requests.
    ///
    /// # Returns
    ///
    /// Observations whose end time lies within each request's inclusive
    /// window, ordered by end time ascending per symbol. An empty vector is
    /// a valid "no data" answer. Failures are reported as
    /// [`HistoryError::SourceUnavailable`]; any retry policy lives in the
    /// implementation.
    async fn fetch(&self, requests: &[ConcreteRequest]) -> Result<Vec<Observation>, HistoryError>;
}
