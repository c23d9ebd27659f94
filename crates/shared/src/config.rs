use crate::errors::AppError;
use crate::tracing::LogFormat;
use std::env;
use std::fmt;

pub const MONGODB_URI_VAR: &str = "MONGODB_URI";
pub const MONGODB_NAME_VAR: &str = "MONGODB_NAME";
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// 実行環境
///
/// `ENVIRONMENT=dev` のときだけローカル HTTP サーバで起動し、それ以外は Lambda として起動する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Lambda,
}

impl Environment {
    pub fn from_env() -> Self {
        Self::parse(env::var(ENVIRONMENT_VAR).ok().as_deref())
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dev") => Environment::Dev,
            _ => Environment::Lambda,
        }
    }

    /// ローカルでは人が読む形式、Lambda では CloudWatch 向けの JSON 形式
    pub fn log_format(&self) -> LogFormat {
        match self {
            Environment::Dev => LogFormat::Pretty,
            Environment::Lambda => LogFormat::Json,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_name: String,
    pub environment: Environment,
}

impl Config {
    /// プロセスの環境変数から設定を読み込む
    ///
    /// `.env` の反映は起動時に [`load_env_file`] で一度だけ行う。
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Configuration(format!("Missing environment variable: {key}"))
                })
        };

        Ok(Config {
            mongodb_uri: required(MONGODB_URI_VAR)?,
            mongodb_name: required(MONGODB_NAME_VAR)?,
            environment: Environment::parse(lookup(ENVIRONMENT_VAR).as_deref()),
        })
    }
}

// 接続文字列には認証情報が含まれうるためログに出さない
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mongodb_uri", &"<redacted>")
            .field("mongodb_name", &self.mongodb_name)
            .field("environment", &self.environment)
            .finish()
    }
}

/// `.env` ファイルを読み込む。ファイルが無くてもエラーにはしない
pub fn load_env_file() {
    if let Ok(path) = dotenv::dotenv() {
        ::tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}
