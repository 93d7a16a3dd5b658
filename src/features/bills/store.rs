use super::models::{Bill, BillUpdate, CreatedBill, ReceiptUpload};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// 経費ノートのデータアクセス境界
///
/// リモートAPI・インメモリなど実装を差し替えられるようにする。
/// どの操作も失敗しうるが、エラーは呼び出し側にそのまま伝播させる。
#[async_trait]
pub trait BillStore: Send + Sync {
    /// 現在のユーザーの経費ノート一覧を取得する
    async fn list(&self) -> AppResult<Vec<Bill>>;

    /// 領収書ファイルをアップロードし、経費ノートを仮登録する
    async fn create(&self, upload: ReceiptUpload) -> AppResult<CreatedBill>;

    /// 仮登録された経費ノートにフォームの内容を反映する
    async fn update(&self, id: &str, update: BillUpdate) -> AppResult<Bill>;
}
