use domain::LogDocument;
use infrastructure::{LogRepository, MongoDbClient, MongoLogRepository, RepositoryError};
use shared::{Config, Environment};

/// 統合テスト用の設定
fn test_config(uri: &str) -> Config {
    Config {
        mongodb_uri: uri.to_string(),
        mongodb_name: "log_ingest_test".to_string(),
        environment: Environment::Lambda,
    }
}

/// 到達不能なサーバーへの挿入はエラー文言付きで失敗する
#[tokio::test]
async fn test_insert_into_unreachable_server_fails() {
    let config = test_config(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300&connectTimeoutMS=300&directConnection=true",
    );
    let client = MongoDbClient::connect(&config)
        .await
        .expect("接続文字列のパースに失敗");
    let repo = MongoLogRepository::new(&client);

    let doc = LogDocument::parse(r#"{"a":1}"#).unwrap();
    let result = repo.insert_log(doc).await;

    match result {
        Err(RepositoryError::MongoDb(message)) => assert!(!message.is_empty()),
        other => panic!("Expected MongoDB error, got {other:?}"),
    }
}

/// 不正な接続文字列は起動時のエラーになる
#[tokio::test]
async fn test_connect_with_invalid_uri_fails() {
    let config = test_config("not-a-mongodb-uri");

    let result = MongoDbClient::connect(&config).await;

    assert!(matches!(result, Err(RepositoryError::Connection(_))));
}

#[tokio::test]
async fn test_client_selects_configured_database() {
    let config = test_config("mongodb://127.0.0.1:27017");
    let client = MongoDbClient::connect(&config).await.unwrap();

    assert_eq!(client.database().name(), "log_ingest_test");
    assert_eq!(client.collection("logs").name(), "logs");
}

/// 実際の MongoDB が必要（MONGODB_URI を設定して `cargo test -- --ignored` で実行）
#[tokio::test]
#[ignore]
async fn test_insert_into_live_server() {
    let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI が必要です");
    let config = test_config(&uri);
    let client = MongoDbClient::connect(&config).await.unwrap();
    let repo = MongoLogRepository::new(&client);

    let doc = LogDocument::parse(r#"{"level":"info","msg":"integration"}"#).unwrap();
    repo.insert_log(doc.clone()).await.unwrap();
    repo.insert_log(doc).await.unwrap();
}
