use crate::repositories::RepositoryError;
use mongodb::bson::Document;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database};
use shared::Config;
use tracing::info;

const APP_NAME: &str = "log-ingest";

/// プロセス全体で共有する MongoDB ハンドル
///
/// `Client` は内部でコネクションプールを持ち、複製しても同じプールを共有する。
#[derive(Clone, Debug)]
pub struct MongoDbClient {
    client: Client,
    database: Database,
}

impl MongoDbClient {
    /// 接続文字列をパースしてクライアントを作成する（Stable API v1）
    ///
    /// ドライバは遅延接続のため、サーバーに到達できなくてもここでは失敗しない。
    pub async fn connect(config: &Config) -> Result<Self, RepositoryError> {
        let mut options = ClientOptions::parse(&config.mongodb_uri)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }

        let client =
            Client::with_options(options).map_err(|e| RepositoryError::Connection(e.to_string()))?;
        let database = client.database(&config.mongodb_name);

        info!(database = %config.mongodb_name, "MongoDB client initialized");

        Ok(Self { client, database })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}
