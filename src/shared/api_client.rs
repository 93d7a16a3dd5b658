/// 汎用APIクライアント
///
/// Billed APIサーバーとの通信を行うクライアント。
/// JSONリクエストとマルチパート（領収書ファイル）アップロードに対応する。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        ApiConfig::default().into()
    }
}

impl From<ApiConfig> for ApiClientConfig {
    fn from(api_config: ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// マルチパートで送信するファイル
#[derive(Debug, Clone)]
pub struct MultipartFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = self.client.get(self.url(endpoint));
        let request = with_auth(request, auth_token);

        self.send_request_with_retry(request, "GET", endpoint).await
    }

    /// PATCHリクエストを送信
    pub async fn patch<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request = self.client.patch(self.url(endpoint)).json(body);
        let request = with_auth(request, auth_token);

        self.send_request_with_retry(request, "PATCH", endpoint)
            .await
    }

    /// マルチパートPOSTリクエストを送信
    ///
    /// マルチパートのボディは複製できないため、リトライごとにフォームを組み立て直す。
    /// アップロードは冪等ではないので、接続確立前に失敗した場合のみリトライする。
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        file: &MultipartFile,
        fields: &[(&str, String)],
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!(
            "マルチパートPOSTリクエスト送信: endpoint={endpoint}, file={}",
            file.file_name
        );

        let url = self.url(endpoint);
        let mut attempts = 0;
        loop {
            let part = multipart::Part::bytes(file.data.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| AppError::validation(format!("MIMEタイプ設定エラー: {e}")))?;

            let mut form = multipart::Form::new().part(file.field_name.clone(), part);
            for (name, value) in fields {
                form = form.text(name.to_string(), value.clone());
            }

            let request = with_auth(self.client.post(&url).multipart(form), auth_token);

            match request.send().await {
                Ok(response) => return self.parse_response(response, "POST", endpoint).await,
                Err(e) => {
                    if e.is_connect() && attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = backoff_delay(attempts);
                        warn!(
                            "APIサーバーに接続できません、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if !e.is_connect() {
                        warn!("送信後に通信が切断されたためリトライしません: endpoint={endpoint}");
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url)
    }

    /// リトライ機能付きでリクエストを送信
    async fn send_request_with_retry<T>(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let mut attempts = 0;
        loop {
            let Some(cloned_request) = request.try_clone() else {
                return Err(AppError::ExternalService(
                    "リクエストのクローンに失敗しました".to_string(),
                ));
            };

            match cloned_request.send().await {
                Ok(response) => return self.parse_response(response, method, endpoint).await,
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = backoff_delay(attempts);
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    async fn parse_response<T>(&self, response: Response, method: &str, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            let result: T = response
                .json()
                .await
                .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

            info!("{method}リクエスト成功: endpoint={endpoint}");
            return Ok(result);
        }

        Err(self.handle_error_response(response).await)
    }

    /// エラーレスポンスをAppErrorに変換する
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status_code = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        let message = match serde_json::from_str::<ErrorResponse>(&response_text) {
            Ok(error_response) => {
                debug!(
                    "APIサーバーから構造化エラーレスポンスを受信: status={status_code}, message={}",
                    error_response.message
                );
                error_response.message
            }
            Err(_) => {
                warn!(
                    "APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}"
                );
                response_text
            }
        };

        match status_code {
            404 => AppError::NotFound(message),
            401 | 403 => AppError::Session(message),
            _ => AppError::ExternalService(format!("HTTP {status_code}: {message}")),
        }
    }
}

/// 認証トークンがある場合はAuthorizationヘッダーを付与する
fn with_auth(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
    match auth_token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}

/// バックオフの上限（秒）
const MAX_BACKOFF_SECONDS: u64 = 60;

/// 指数バックオフ（2^attempts秒、上限あり）
fn backoff_delay(attempts: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempts).min(MAX_BACKOFF_SECONDS))
}
