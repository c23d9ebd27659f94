use handler::LogIngestHandler;
use infrastructure::{MongoDbClient, MongoLogRepository};
use lambda_runtime::Error;
use shared::{tracing::init_tracing, AppError, Config, Environment};
use std::sync::Arc;
use tracing::info;

mod dev_server;
mod handler;
mod lambda;
mod request;

#[tokio::main]
async fn main() -> Result<(), Error> {
    shared::load_env_file();
    let environment = Environment::from_env();

    if let Err(e) = init_tracing(environment.log_format()) {
        eprintln!("トレーシング初期化エラー: {e}");
        // トレーシング初期化に失敗してもアプリケーションは継続
    }

    // 設定不備と接続文字列の不正は復旧不能なので即座に終了する
    let config = Config::from_env().unwrap_or_else(|e| exit_on_startup_error(e));
    let db_client = MongoDbClient::connect(&config)
        .await
        .unwrap_or_else(|e| exit_on_startup_error(AppError::Configuration(e.to_string())));

    let handler = LogIngestHandler::new(Arc::new(MongoLogRepository::new(&db_client)));

    match config.environment {
        Environment::Dev => {
            info!("Starting local dev server");
            dev_server::serve(Arc::new(handler)).await?;
            Ok(())
        }
        Environment::Lambda => {
            info!("Starting Lambda runtime");
            lambda::run(handler).await
        }
    }
}

fn exit_on_startup_error(error: AppError) -> ! {
    error.log();
    eprintln!("起動エラー: {error}");
    std::process::exit(1);
}
