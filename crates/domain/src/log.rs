use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 取り込まれたログ1件分のドキュメント
///
/// スキーマを持たず、リクエストボディの JSON オブジェクトをそのまま保持する。
/// フィールドの付与や正規化は一切行わない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogDocument(Map<String, Value>);

impl LogDocument {
    /// リクエストボディを JSON としてパースする
    ///
    /// トップレベルはオブジェクトである必要がある（ドキュメントとして保存するため）。
    /// `null` だけは空のドキュメントとして受け付ける。
    pub fn parse(body: &str) -> Result<Self, DomainError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| DomainError::InvalidJson(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DomainError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for LogDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
