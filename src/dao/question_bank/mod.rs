#[cfg(feature = "mongo-bank")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::QuestionEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the question content source consumed by room creation.
pub trait QuestionBank: Send + Sync {
    /// All questions belonging to any of the given categories, in the
    /// backend's natural order.
    fn questions_for_categories(
        &self,
        categories: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Distinct category names available in the bank.
    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Cheap connectivity probe used by the supervisor and health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
