//! ローカル開発用の HTTP サーバ
//!
//! `ANY /lambda` で受けた生の HTTP リクエストを Lambda と同じリクエスト表現に詰め替えて
//! ハンドラーへ渡す。

use crate::handler::RequestHandler;
use crate::request::{InvocationContext, ProxyRequest, ProxyResponse};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use shared::telemetry::trace_http_request;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

pub const DEV_SERVER_PORT: u16 = 8080;
pub const LAMBDA_PATH: &str = "/lambda";

/// ルータを構築して返します。
pub fn router(handler: Arc<dyn RequestHandler>) -> Router {
    Router::new()
        .route(LAMBDA_PATH, any(proxy_to_handler))
        .with_state(handler)
}

/// ローカルサーバを起動
pub async fn serve(handler: Arc<dyn RequestHandler>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], DEV_SERVER_PORT));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, path = LAMBDA_PATH, "dev server starting");

    axum::serve(listener, router(handler)).await
}

async fn proxy_to_handler(
    State(handler): State<Arc<dyn RequestHandler>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = ProxyRequest {
        method: method.to_string(),
        headers: flatten_headers(&headers),
        query_string_parameters: flatten_query(&uri),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let response = handler.handle(request, InvocationContext::default()).await;
    trace_http_request(method.as_str(), uri.path(), response.status_code);

    into_http_response(response)
}

/// ヘッダーを1キー1値に平坦化する（同名ヘッダーは最初の値のみ残す）
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flattened = HashMap::new();
    for (name, value) in headers {
        flattened
            .entry(name.as_str().to_string())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    flattened
}

/// クエリパラメーターを1キー1値に平坦化する（同名キーは最初の値のみ残す）
/// パースできないクエリは空として扱う
pub fn flatten_query(uri: &Uri) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = Query::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();

    let mut flattened = HashMap::new();
    for (key, value) in pairs {
        flattened.entry(key).or_insert(value);
    }
    flattened
}

fn into_http_response(response: ProxyResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or_else(|_| {
        warn!(status_code = response.status_code, "Invalid status code from handler");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }

    (status, headers, response.body).into_response()
}
