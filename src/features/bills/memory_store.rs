// インメモリのStore実装（ローカル動作・テスト用）

use super::models::{Bill, BillStatus, BillUpdate, CreatedBill, ReceiptUpload};
use super::store::BillStore;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::nanoid::generate_bill_id;
use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::Mutex;

/// アップロードされたファイルのURLに使うスキーム
const MEMORY_FILE_URL_PREFIX: &str = "memory://receipts";

/// インメモリの経費ノートStore
///
/// 挿入順を保持する
#[derive(Default)]
pub struct MemoryBillStore {
    bills: Mutex<Vec<Bill>>,
}

impl MemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の経費ノートで初期化する
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Mutex::new(bills),
        }
    }

    /// 保持している経費ノートの件数
    pub async fn len(&self) -> usize {
        self.bills.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bills.lock().await.is_empty()
    }
}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let bills = self.bills.lock().await;
        debug!("インメモリStoreから経費ノート一覧を取得: count={}", bills.len());
        Ok(bills.clone())
    }

    async fn create(&self, upload: ReceiptUpload) -> AppResult<CreatedBill> {
        let id = generate_bill_id();
        let file_url = format!(
            "{MEMORY_FILE_URL_PREFIX}/{id}/{}",
            urlencoding::encode(&upload.file_name)
        );

        let placeholder = Bill {
            id: id.clone(),
            expense_type: String::new(),
            name: String::new(),
            amount: 0.0,
            date: String::new(),
            vat: String::new(),
            pct: None,
            commentary: None,
            file_url: file_url.clone(),
            file_name: upload.file_name.clone(),
            status: BillStatus::Pending,
            comment_admin: None,
            email: upload.email,
        };

        self.bills.lock().await.push(placeholder);
        info!(
            "経費ノートを仮登録しました: id={id}, file={}, size={} bytes",
            upload.file_name,
            upload.data.len()
        );

        Ok(CreatedBill {
            id,
            file_url,
            file_name: upload.file_name,
        })
    }

    async fn update(&self, id: &str, update: BillUpdate) -> AppResult<Bill> {
        let mut bills = self.bills.lock().await;
        let slot = bills
            .iter_mut()
            .find(|bill| bill.id == id)
            .ok_or_else(|| AppError::not_found(format!("bill {id}")))?;

        let comment_admin = slot.comment_admin.take();
        let mut updated = update.into_bill(id.to_string());
        updated.comment_admin = comment_admin;
        *slot = updated.clone();

        info!("経費ノートを更新しました: id={id}");
        Ok(updated)
    }
}
