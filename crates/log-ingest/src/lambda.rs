use crate::handler::LogIngestHandler;
use crate::request::{InvocationContext, ProxyRequest, ProxyResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lambda_runtime::{service_fn, Context, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::telemetry::{create_lambda_span, trace_http_request, LambdaTraceContext};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;
use tracing::{info, Instrument};

/// API Gateway プロキシリクエスト構造体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayProxyRequest {
    http_method: Option<String>,
    path: Option<String>,
    headers: Option<HashMap<String, String>>,
    query_string_parameters: Option<HashMap<String, String>>,
    body: Option<String>,
    is_base64_encoded: Option<bool>,
}

impl ApiGatewayProxyRequest {
    /// 共通のリクエスト表現へ変換
    /// Base64 のボディはデコードし、失敗した場合はそのまま渡す（後段の JSON パースで 400 になる）
    pub fn into_proxy_request(self) -> ProxyRequest {
        let body = self.body.unwrap_or_default();
        let body = if self.is_base64_encoded.unwrap_or(false) {
            decode_base64_body(&body).unwrap_or(body)
        } else {
            body
        };

        ProxyRequest {
            method: self.http_method.unwrap_or_default(),
            headers: self.headers.unwrap_or_default(),
            query_string_parameters: self.query_string_parameters.unwrap_or_default(),
            body,
        }
    }
}

fn decode_base64_body(body: &str) -> Option<String> {
    let bytes = STANDARD.decode(body).ok()?;
    String::from_utf8(bytes).ok()
}

/// API Gateway プロキシレスポンス構造体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
    is_base64_encoded: bool,
}

impl From<ProxyResponse> for ApiGatewayProxyResponse {
    fn from(response: ProxyResponse) -> Self {
        Self {
            status_code: response.status_code,
            headers: response.headers,
            body: response.body,
            is_base64_encoded: false,
        }
    }
}

/// Lambda の deadline（UNIX エポックからのミリ秒）を tokio の時刻に変換
/// 0 は未設定として扱う
fn invocation_deadline(deadline_ms: u64) -> Option<Instant> {
    if deadline_ms == 0 {
        return None;
    }

    let deadline = UNIX_EPOCH + Duration::from_millis(deadline_ms);
    let remaining = deadline
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO);
    Some(Instant::now() + remaining)
}

/// Lambda 関数のメイン処理
pub async fn function_handler(
    handler: &LogIngestHandler,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (payload, context) = event.into_parts();
    let response = handle_event(handler, payload, &context).await;
    Ok(response.into())
}

async fn handle_event(
    handler: &LogIngestHandler,
    payload: ApiGatewayProxyRequest,
    context: &Context,
) -> ProxyResponse {
    let trace_context = LambdaTraceContext::from_lambda_context(context);
    let span = create_lambda_span("log-ingest", &trace_context);

    async move {
        let path = payload.path.clone().unwrap_or_default();
        let request = payload.into_proxy_request();
        let method = request.method.clone();

        info!(method = %method, path = %path, "Lambda function started");

        let invocation = InvocationContext {
            request_id: Some(trace_context.request_id.clone()),
            deadline: invocation_deadline(context.deadline),
        };
        let response = handler.handle(request, invocation).await;

        trace_http_request(&method, &path, response.status_code);
        response
    }
    .instrument(span)
    .await
}

/// Lambda ランタイムを起動
pub async fn run(handler: LogIngestHandler) -> Result<(), Error> {
    let handler = &handler;
    lambda_runtime::run(service_fn(move |event| function_handler(handler, event))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::InMemoryLogRepository;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn api_gateway_event(body: Value) -> ApiGatewayProxyRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_deserialize_api_gateway_event() {
        let event = api_gateway_event(json!({
            "resource": "/logs",
            "path": "/logs",
            "httpMethod": "POST",
            "headers": {"Content-Type": "application/json"},
            "multiValueHeaders": {"Content-Type": ["application/json"]},
            "queryStringParameters": {"source": "app"},
            "pathParameters": null,
            "requestContext": {"requestId": "abc"},
            "body": "{\"a\":1}",
            "isBase64Encoded": false
        }));

        let request = event.into_proxy_request();

        assert_eq!(request.method, "POST");
        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            request.query_string_parameters.get("source"),
            Some(&"app".to_string())
        );
        assert_eq!(request.body, "{\"a\":1}");
    }

    #[test]
    fn test_deserialize_event_with_null_fields() {
        let event = api_gateway_event(json!({
            "httpMethod": "POST",
            "headers": null,
            "queryStringParameters": null,
            "body": null,
            "isBase64Encoded": null
        }));

        let request = event.into_proxy_request();

        assert!(request.headers.is_empty());
        assert!(request.query_string_parameters.is_empty());
        assert_eq!(request.body, "");
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let event = api_gateway_event(json!({
            "httpMethod": "POST",
            "body": STANDARD.encode(r#"{"level":"warn"}"#),
            "isBase64Encoded": true
        }));

        assert_eq!(event.into_proxy_request().body, r#"{"level":"warn"}"#);
    }

    #[test]
    fn test_invalid_base64_body_is_passed_through() {
        let event = api_gateway_event(json!({
            "httpMethod": "POST",
            "body": "%%%not-base64%%%",
            "isBase64Encoded": true
        }));

        assert_eq!(event.into_proxy_request().body, "%%%not-base64%%%");
    }

    #[test]
    fn test_response_serialization() {
        let response: ApiGatewayProxyResponse =
            ProxyResponse::json(201, json!({"msg": "Log successfully added!"})).into();

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 201);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(value["body"], r#"{"msg":"Log successfully added!"}"#);
        assert_eq!(value["isBase64Encoded"], false);
    }

    #[test]
    fn test_invocation_deadline() {
        assert!(invocation_deadline(0).is_none());

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let future = invocation_deadline(now_ms + 60_000).unwrap();
        assert!(future > Instant::now() + Duration::from_secs(30));

        // 過去の deadline は即時
        let past = invocation_deadline(now_ms - 60_000).unwrap();
        assert!(past <= Instant::now());
    }

    #[tokio::test]
    async fn test_function_handler_stores_log() {
        let repo = Arc::new(InMemoryLogRepository::new());
        let handler = LogIngestHandler::new(repo.clone());
        let event = LambdaEvent::new(
            api_gateway_event(json!({
                "httpMethod": "POST",
                "path": "/logs",
                "body": "{\"level\":\"info\",\"msg\":\"started\"}"
            })),
            Context::default(),
        );

        let response = function_handler(&handler, event).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 201);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_function_handler_never_returns_error_for_bad_input() {
        let repo = Arc::new(InMemoryLogRepository::new());
        let handler = LogIngestHandler::new(repo.clone());
        let event = LambdaEvent::new(
            api_gateway_event(json!({"httpMethod": "POST", "body": "not-json"})),
            Context::default(),
        );

        let response = function_handler(&handler, event).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 400);
        assert!(repo.is_empty());
    }
}
