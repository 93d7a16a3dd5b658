/// Billed APIサーバーを利用するStore実装
///
/// 認証トークンはセッションの `jwt` から毎回読み込む。
use super::models::{Bill, BillUpdate, CreatedBill, ReceiptUpload};
use super::store::BillStore;
use crate::features::session::auth_token;
use crate::features::session::storage::SessionStorage;
use crate::shared::api_client::{ApiClient, MultipartFile};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use log::{debug, error, info};
use serde_json::Value;
use std::sync::Arc;

/// 経費ノートのエンドポイント
const BILLS_ENDPOINT: &str = "/bills";

/// 領収書ファイルのフィールド名
const FILE_FIELD: &str = "file";

pub struct ApiBillStore {
    client: ApiClient,
    session: Arc<dyn SessionStorage>,
}

impl ApiBillStore {
    pub fn new(client: ApiClient, session: Arc<dyn SessionStorage>) -> Self {
        Self { client, session }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn token(&self) -> AppResult<Option<String>> {
        auth_token(self.session.as_ref())
    }
}

/// 個別の経費ノートのエンドポイント
fn bill_endpoint(id: &str) -> String {
    format!("{BILLS_ENDPOINT}/{}", urlencoding::encode(id))
}

/// 一覧のレスポンスを1件ずつ解析する
///
/// 解析できないレコードはエラーログに残して除外し、他のレコードには影響させない
fn decode_bills(records: Vec<Value>) -> Vec<Bill> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match serde_json::from_value::<Bill>(record.clone()) {
                Ok(bill) => Some(bill),
                Err(e) => {
                    error!("経費ノートを解析できません: index={index}, error={e}, record={record}");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl BillStore for ApiBillStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let token = self.token()?;
        let records: Vec<Value> = self.client.get(BILLS_ENDPOINT, token.as_deref()).await?;
        let bills = decode_bills(records);
        debug!("APIから経費ノート一覧を取得: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, upload: ReceiptUpload) -> AppResult<CreatedBill> {
        let token = self.token()?;
        let file = MultipartFile {
            field_name: FILE_FIELD.to_string(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type,
            data: upload.data,
        };
        let fields = [("email", upload.email)];

        let mut created: CreatedBill = self
            .client
            .post_multipart(BILLS_ENDPOINT, &file, &fields, token.as_deref())
            .await?;

        if created.file_name.is_empty() {
            created.file_name = upload.file_name;
        }

        info!("経費ノートを仮登録しました: id={}", created.id);
        Ok(created)
    }

    async fn update(&self, id: &str, update: BillUpdate) -> AppResult<Bill> {
        let token = self.token()?;
        let bill: Bill = self
            .client
            .patch(&bill_endpoint(id), &update, token.as_deref())
            .await?;

        info!("経費ノートを更新しました: id={}", bill.id);
        Ok(bill)
    }
}
