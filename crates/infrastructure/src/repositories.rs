use crate::mongo::MongoDbClient;
use async_trait::async_trait;
use domain::LogDocument;
use mongodb::bson::{Bson, Document};
use mongodb::Collection;
use serde_json::Value;
use shared::{telemetry::trace_mongodb_operation, AppError};
use thiserror::Error;
use tracing::debug;

/// ログを保存するコレクション名
pub const LOGS_COLLECTION: &str = "logs";

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    MongoDb(String),
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(e: mongodb::error::Error) -> Self {
        RepositoryError::MongoDb(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

/// ログの書き込み口
///
/// ハンドラーはこのトレイト越しに永続化するため、テストではインメモリ実装に差し替えられる。
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// ドキュメントを1件挿入する。重複排除もリトライも行わない
    async fn insert_log(&self, document: LogDocument) -> Result<(), RepositoryError>;
}

pub struct MongoLogRepository {
    collection: Collection<Document>,
}

impl MongoLogRepository {
    pub fn new(db: &MongoDbClient) -> Self {
        Self {
            collection: db.collection(LOGS_COLLECTION),
        }
    }
}

#[async_trait]
impl LogRepository for MongoLogRepository {
    async fn insert_log(&self, document: LogDocument) -> Result<(), RepositoryError> {
        let document = to_bson_document(document);

        trace_mongodb_operation(LOGS_COLLECTION, "insert_one", || async move {
            let result = self.collection.insert_one(document).await?;
            debug!(inserted_id = %result.inserted_id, "Log document inserted");
            Ok::<(), RepositoryError>(())
        })
        .await
    }
}

/// JSON オブジェクトを BSON ドキュメントへ変換する
pub fn to_bson_document(document: LogDocument) -> Document {
    document
        .into_fields()
        .into_iter()
        .map(|(key, value)| (key, to_bson(value)))
        .collect()
}

/// 整数は Int64、小数は Double。
/// BSON には符号なし64ビット整数が無いので、i64 を超える値は Double として保存する。
fn to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Bson::Int64(i),
            (None, Some(u)) => Bson::Double(u as f64),
            (None, None) => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(key, value)| (key, to_bson(value)))
                .collect(),
        ),
    }
}
