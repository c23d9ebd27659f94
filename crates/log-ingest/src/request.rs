use serde_json::Value;
use std::collections::HashMap;
use tokio::time::Instant;

/// アダプター共通のリクエスト表現
///
/// ヘッダーとクエリパラメーターは1キー1値に平坦化済み。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub query_string_parameters: HashMap<String, String>,
    pub body: String,
}

/// アダプター共通のレスポンス表現
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    /// JSON レスポンスを作成
    pub fn json(status_code: u16, body: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }
}

/// 呼び出し単位のコンテキスト
///
/// `deadline` があれば、その時刻までに挿入が終わらない場合に打ち切る。
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: Option<String>,
    pub deadline: Option<Instant>,
}
