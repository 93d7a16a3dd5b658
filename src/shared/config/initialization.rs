use crate::features::bills::api_store::ApiBillStore;
use crate::features::session::storage::FileSessionStorage;
use crate::shared::api_client::ApiClient;
use crate::shared::config::environment::session_file_path;
use crate::shared::config::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment,
};
use crate::shared::errors::AppResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// アプリケーション初期化の結果を表す構造体
pub struct InitializationResult {
    /// 実行環境
    pub environment: Environment,
    /// 検証済みのAPI設定
    pub api_config: ApiConfig,
    /// セッションファイルのパス
    pub session_path: PathBuf,
    /// 初回起動かどうか（セッションファイルがまだ存在しない）
    pub is_first_run: bool,
    pub session: Arc<FileSessionStorage>,
    pub store: Arc<ApiBillStore>,
}

/// アプリケーションの初期化を実行する
///
/// # 処理内容
/// 1. 環境変数の読み込み
/// 2. ログシステムの初期化
/// 3. API設定の読み込みと検証
/// 4. セッションストレージとStoreの構築
pub fn initialize_application() -> AppResult<InitializationResult> {
    load_environment_variables();
    initialize_logging_system();

    let environment = get_environment();
    let api_config = ApiConfig::from_env();
    let session_path = session_file_path()?;

    build_services(environment, api_config, session_path)
}

/// 設定からセッションストレージとStoreを構築する
pub fn build_services(
    environment: Environment,
    api_config: ApiConfig,
    session_path: PathBuf,
) -> AppResult<InitializationResult> {
    api_config.validate()?;

    if environment == Environment::Production && api_config.is_localhost() {
        log::warn!(
            "本番環境でlocalhostのAPIサーバーが設定されています: {}",
            api_config.base_url
        );
    }

    let is_first_run = !session_path.exists();
    if is_first_run {
        log_first_run_initialization(&environment, &session_path);
    }

    let session = Arc::new(FileSessionStorage::new(session_path.clone()));
    let client = ApiClient::new_with_config(api_config.clone().into())?;
    let store = Arc::new(ApiBillStore::new(client, session.clone()));

    Ok(InitializationResult {
        environment,
        api_config,
        session_path,
        is_first_run,
        session,
        store,
    })
}

/// 初回起動時の初期化ログを出力する
fn log_first_run_initialization(environment: &Environment, session_path: &Path) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("セッションファイル: {session_path:?}");
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("=== 初期化完了 ===");
    } else {
        log::info!("アプリケーション起動完了（既存セッションを使用）");
    }
    log::info!("環境: {:?}", result.environment);
    log::info!("APIサーバー: {}", result.store.base_url());
}
