/// Background reconnect loop for the question bank.
#[cfg(feature = "mongo-bank")]
pub mod bank_supervisor;
/// Category listing backed by the question bank.
pub mod category_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Gameplay operations: host transitions, answers, and scoring.
pub mod play_service;
/// Periodic expiry sweep for abandoned rooms.
pub mod room_reaper;
/// Room lifecycle: creation, joining, and leaving.
pub mod room_service;
/// Server-Sent Events streaming of room snapshots.
pub mod sse_service;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use futures::future::BoxFuture;

    use crate::{
        config::AppConfig,
        dao::{models::QuestionEntity, question_bank::QuestionBank, storage::StorageResult},
        state::{AppState, SharedState},
    };

    /// In-memory question bank used by service tests.
    pub(crate) struct StubBank {
        questions: Vec<QuestionEntity>,
    }

    impl StubBank {
        /// Bank holding `count` questions in the given category, every one
        /// with the same correct option index.
        pub(crate) fn with_questions(category: &str, count: usize, correct_index: usize) -> Self {
            let questions = (0..count)
                .map(|i| QuestionEntity {
                    category: category.to_string(),
                    question: format!("question {i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_index,
                    explanation: None,
                })
                .collect();
            Self { questions }
        }
    }

    impl QuestionBank for StubBank {
        fn questions_for_categories(
            &self,
            categories: Vec<String>,
        ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
            let matching: Vec<QuestionEntity> = self
                .questions
                .iter()
                .filter(|q| categories.contains(&q.category))
                .cloned()
                .collect();
            Box::pin(async move { Ok(matching) })
        }

        fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
            let mut categories: Vec<String> =
                self.questions.iter().map(|q| q.category.clone()).collect();
            categories.dedup();
            Box::pin(async move { Ok(categories) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async move { Ok(()) })
        }
    }

    /// Fresh shared state with the given stub bank installed.
    pub(crate) async fn state_with_bank(bank: StubBank) -> SharedState {
        let state = AppState::new(AppConfig::default());
        state.install_question_bank(Arc::new(bank)).await;
        state
    }
}
