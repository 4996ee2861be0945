//! MongoDB-backed question bank reading the shared content collection.

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, bson::doc};
use tracing::debug;

use crate::dao::{
    models::QuestionEntity,
    question_bank::QuestionBank,
    storage::{StorageError, StorageResult},
};

/// Question bank reading from a MongoDB collection of question documents.
#[derive(Clone)]
pub struct MongoQuestionBank {
    client: Client,
    db_name: String,
    collection_name: String,
}

impl MongoQuestionBank {
    /// Connect to MongoDB and verify the deployment answers a ping.
    pub async fn connect(
        uri: &str,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri).await.map_err(|source| {
            StorageError::unavailable("failed to build MongoDB client".into(), source)
        })?;

        let bank = Self {
            client,
            db_name: db_name.to_string(),
            collection_name: collection_name.to_string(),
        };
        bank.ping().await?;
        debug!(db = db_name, collection = collection_name, "connected to MongoDB");
        Ok(bank)
    }

    fn collection(&self) -> Collection<QuestionEntity> {
        self.client
            .database(&self.db_name)
            .collection::<QuestionEntity>(&self.collection_name)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.client
            .database(&self.db_name)
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|source| StorageError::unavailable("MongoDB ping failed".into(), source))?;
        Ok(())
    }
}

impl QuestionBank for MongoQuestionBank {
    fn questions_for_categories(
        &self,
        categories: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let collection = self.collection();
        Box::pin(async move {
            let cursor = collection
                .find(doc! {"category": {"$in": categories}})
                .await
                .map_err(|source| {
                    StorageError::unavailable("failed to query questions".into(), source)
                })?;

            cursor.try_collect().await.map_err(|source| {
                StorageError::unavailable("failed to read question cursor".into(), source)
            })
        })
    }

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let collection = self.collection();
        Box::pin(async move {
            let values = collection
                .distinct("category", doc! {})
                .await
                .map_err(|source| {
                    StorageError::unavailable("failed to list categories".into(), source)
                })?;

            Ok(values
                .into_iter()
                .filter_map(|value| value.as_str().map(str::to_owned))
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let bank = self.clone();
        Box::pin(async move { bank.ping().await })
    }
}
