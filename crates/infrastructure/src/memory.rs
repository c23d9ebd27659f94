use crate::repositories::{LogRepository, RepositoryError};
use async_trait::async_trait;
use domain::LogDocument;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// 簡易な InMemory 実装（開発/テスト用）
#[derive(Default)]
pub struct InMemoryLogRepository {
    documents: Mutex<Vec<LogDocument>>,
    // 設定されていれば挿入を常にこのメッセージで失敗させる
    failure: Option<String>,
    delay: Option<Duration>,
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 到達不能なデータベースを模したリポジトリ
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// 挿入前に待機する（デッドライン超過の再現用）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn documents(&self) -> Vec<LogDocument> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn insert_log(&self, document: LogDocument) -> Result<(), RepositoryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(RepositoryError::MongoDb(message.clone()));
        }

        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(document);
        Ok(())
    }
}
