use serde::{Deserialize, Serialize};
use thiserror::Error;

/// アプリケーション全体で使用されるエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // 入力エラー
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    // 永続化エラー
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Timeout occurred: {0}")]
    Timeout(String),

    // 起動時のみ発生する
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// エラーの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
    /// 起動を継続できないエラー
    Fatal,
}

/// エラーの重要度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
}

impl AppError {
    pub fn metadata(&self) -> ErrorMetadata {
        match self {
            AppError::Domain(_) => ErrorMetadata {
                code: "INVALID_JSON",
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
            },
            AppError::Persistence(_) => ErrorMetadata {
                code: "PERSISTENCE_ERROR",
                category: ErrorCategory::Server,
                severity: ErrorSeverity::Error,
            },
            AppError::Timeout(_) => ErrorMetadata {
                code: "TIMEOUT",
                category: ErrorCategory::Server,
                severity: ErrorSeverity::Error,
            },
            AppError::Configuration(_) => ErrorMetadata {
                code: "CONFIGURATION_ERROR",
                category: ErrorCategory::Fatal,
                severity: ErrorSeverity::Critical,
            },
        }
    }

    /// HTTPステータスコードを取得
    /// ハンドラーが返すのは 400 か 500 のみ
    pub fn http_status_code(&self) -> u16 {
        match self.metadata().category {
            ErrorCategory::Client => 400,
            ErrorCategory::Server | ErrorCategory::Fatal => 500,
        }
    }

    /// レスポンスボディに載せるメッセージ
    ///
    /// 永続化エラーはバックエンドのエラー文言をそのまま含める。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(_) => "Failed to parse request JSON body".to_string(),
            AppError::Persistence(details) | AppError::Timeout(details) => {
                format!("Failed to insert log into MongoDB. Details: {details}")
            }
            AppError::Configuration(_) => "Missing environment variables!".to_string(),
        }
    }

    pub fn log(&self) {
        let metadata = self.metadata();

        match metadata.severity {
            ErrorSeverity::Critical => {
                ::tracing::error!(error = %self, code = metadata.code, "Critical error occurred")
            }
            ErrorSeverity::Error => {
                ::tracing::error!(error = %self, code = metadata.code, "Error occurred")
            }
            ErrorSeverity::Warning => {
                ::tracing::warn!(error = %self, code = metadata.code, "Warning occurred")
            }
        }
    }
}

/// エラーレスポンスのボディ
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            error: error.user_message(),
        }
    }
}
