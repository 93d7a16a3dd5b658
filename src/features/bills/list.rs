/// 経費ノート一覧画面のコントローラー
///
/// 一覧の取得と正規化、新規作成ボタン・領収書プレビュー・ログアウトの操作を扱う
use super::models::Bill;
use super::normalizer::{normalize_bills, BillNormalizer, IsoDateNormalizer};
use super::store::BillStore;
use crate::features::routes::Route;
use crate::features::session::storage::SessionStorage;
use crate::features::ui::{ModalContent, ModalPresenter, Navigator, ReceiptPreview, ReceiptRef};
use crate::shared::errors::{AppError, AppResult};
use log::{info, warn};
use std::sync::Arc;

/// Storeが設定されていない場合の警告メッセージ
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Store is not available";

/// 一覧取得時に記録された診断情報
#[derive(Debug)]
pub enum FetchDiagnostic {
    /// Storeが設定されていない
    StoreUnavailable,
    /// 1件の正規化に失敗し、元の値のまま返した
    Normalization {
        index: usize,
        bill_id: String,
        error: AppError,
    },
}

/// 一覧取得の結果
#[derive(Debug, Default)]
pub struct FetchReport {
    pub bills: Vec<Bill>,
    pub diagnostics: Vec<FetchDiagnostic>,
}

pub struct BillsListController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    modal: Arc<dyn ModalPresenter>,
    session: Arc<dyn SessionStorage>,
    normalizer: Box<dyn BillNormalizer>,
}

impl BillsListController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        modal: Arc<dyn ModalPresenter>,
        session: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            store,
            navigator,
            modal,
            session,
            normalizer: Box::new(IsoDateNormalizer),
        }
    }

    /// 正規化の判定を差し替える
    pub fn with_normalizer<N: BillNormalizer + 'static>(mut self, normalizer: N) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// 経費ノート一覧を取得する
    ///
    /// Storeがない場合は空の一覧を返す。正規化に失敗したレコードは元の値のまま含める。
    pub async fn fetch_bills(&self) -> AppResult<Vec<Bill>> {
        Ok(self.fetch_bills_report().await?.bills)
    }

    /// 経費ノート一覧を診断情報付きで取得する
    pub async fn fetch_bills_report(&self) -> AppResult<FetchReport> {
        let Some(store) = &self.store else {
            warn!("{STORE_UNAVAILABLE_MESSAGE}");
            return Ok(FetchReport {
                bills: Vec::new(),
                diagnostics: vec![FetchDiagnostic::StoreUnavailable],
            });
        };

        let snapshot = store.list().await?;
        let normalized = normalize_bills(self.normalizer.as_ref(), snapshot);

        let diagnostics = normalized
            .failures
            .into_iter()
            .map(|failure| FetchDiagnostic::Normalization {
                index: failure.index,
                bill_id: failure.bill.id,
                error: failure.error,
            })
            .collect();

        info!("経費ノート一覧を取得しました: count={}", normalized.bills.len());

        Ok(FetchReport {
            bills: normalized.bills,
            diagnostics,
        })
    }

    /// 新規作成ボタン
    pub fn on_create_requested(&self) {
        self.navigator.navigate(Route::NewBill.path());
    }

    /// 目のアイコン：領収書画像をモーダルで表示する
    pub fn on_preview_requested(&self, receipt_ref: &ReceiptRef) -> AppResult<()> {
        let bill_url = receipt_ref
            .bill_url()
            .ok_or_else(|| AppError::validation("Aucun justificatif associé à cette note de frais"))?;

        let preview = ReceiptPreview::for_modal_width(bill_url, self.modal.width());
        self.modal.show(ModalContent::ReceiptPreview(preview));
        Ok(())
    }

    /// ログアウト：セッションを消去してログイン画面に戻る
    pub fn on_logout_requested(&self) -> AppResult<()> {
        self.session.clear()?;
        info!("ログアウトしました");
        self.navigator.navigate(Route::Login.path());
        Ok(())
    }
}
