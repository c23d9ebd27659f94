use crate::request::{InvocationContext, ProxyRequest, ProxyResponse};
use async_trait::async_trait;
use domain::LogDocument;
use infrastructure::LogRepository;
use serde_json::json;
use shared::{AppError, ErrorResponse};
use std::sync::Arc;
use tracing::{debug, info};

const SUCCESS_MESSAGE: &str = "Log successfully added!";

/// アダプターから見たハンドラーの呼び出し口
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: ProxyRequest, context: InvocationContext) -> ProxyResponse;
}

/// ログ取り込みハンドラー
///
/// JSON のパース、`logs` への1件挿入、レスポンス生成の3段階のみ。
/// エラーはすべて JSON レスポンスに変換し、呼び出し元へは返さない。
#[derive(Clone)]
pub struct LogIngestHandler {
    repository: Arc<dyn LogRepository>,
}

impl LogIngestHandler {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, request: ProxyRequest, context: InvocationContext) -> ProxyResponse {
        debug!(
            method = %request.method,
            headers = request.headers.len(),
            query_params = request.query_string_parameters.len(),
            body_bytes = request.body.len(),
            "Handling log ingest request"
        );

        match self.ingest(&request.body, &context).await {
            Ok(()) => {
                info!(
                    request_id = context.request_id.as_deref().unwrap_or("none"),
                    "Log ingested"
                );
                ProxyResponse::json(201, json!({ "msg": SUCCESS_MESSAGE }))
            }
            Err(e) => {
                e.log();
                ProxyResponse::json(
                    e.http_status_code(),
                    json!(ErrorResponse::from_app_error(&e)),
                )
            }
        }
    }

    async fn ingest(&self, body: &str, context: &InvocationContext) -> Result<(), AppError> {
        let document = LogDocument::parse(body)?;
        let insert = self.repository.insert_log(document);

        match context.deadline {
            // デッドラインを過ぎたら挿入中の future を破棄する
            Some(deadline) => tokio::time::timeout_at(deadline, insert)
                .await
                .map_err(|_| {
                    AppError::Timeout("deadline exceeded before insert completed".to_string())
                })??,
            None => insert.await?,
        }

        Ok(())
    }
}

#[async_trait]
impl RequestHandler for LogIngestHandler {
    async fn handle(&self, request: ProxyRequest, context: InvocationContext) -> ProxyResponse {
        LogIngestHandler::handle(self, request, context).await
    }
}
