/// 経費ノート作成画面のコントローラー
///
/// 領収書ファイルを検証したうえで、Storeに対して
/// create（ファイルのアップロードと仮登録）→ update（フォーム内容の反映）の順に送信する。
use super::file_validation::{content_type_for, is_allowed_receipt, SelectedFile, INVALID_FORMAT_MESSAGE};
use super::models::{Bill, BillStatus, BillUpdate, ReceiptUpload, EXPENSE_TYPES};
use super::store::BillStore;
use crate::features::routes::Route;
use crate::features::session::current_user_email;
use crate::features::session::storage::SessionStorage;
use crate::features::ui::{Alerter, Navigator};
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use crate::shared::utils::{non_empty, normalize_string, parse_amount, parse_percentage, validate_date};
use log::{debug, error, info, warn};
use std::str::FromStr;
use std::sync::Arc;

/// ファイル未選択のまま送信した場合のアラートメッセージ
pub const MISSING_FILE_MESSAGE: &str = "Veuillez soumettre un fichier avant de continuer.";

/// フォームの入力項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ExpenseType,
    ExpenseName,
    Amount,
    Date,
    Vat,
    Pct,
    Commentary,
}

impl FormField {
    /// 画面上のテストID
    pub fn test_id(&self) -> &'static str {
        match self {
            FormField::ExpenseType => "expense-type",
            FormField::ExpenseName => "expense-name",
            FormField::Amount => "amount",
            FormField::Date => "datepicker",
            FormField::Vat => "vat",
            FormField::Pct => "pct",
            FormField::Commentary => "commentary",
        }
    }
}

impl FromStr for FormField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense-type" => Ok(FormField::ExpenseType),
            "expense-name" => Ok(FormField::ExpenseName),
            "amount" => Ok(FormField::Amount),
            "datepicker" => Ok(FormField::Date),
            "vat" => Ok(FormField::Vat),
            "pct" => Ok(FormField::Pct),
            "commentary" => Ok(FormField::Commentary),
            other => Err(AppError::validation(format!("Champ inconnu: {other}"))),
        }
    }
}

/// フォームの入力値（画面の値をそのまま保持する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

impl Default for NewBillForm {
    fn default() -> Self {
        Self {
            // セレクトボックスの先頭の選択肢
            expense_type: EXPENSE_TYPES[0].to_string(),
            name: String::new(),
            amount: String::new(),
            date: String::new(),
            vat: String::new(),
            pct: String::new(),
            commentary: String::new(),
        }
    }
}

impl NewBillForm {
    pub fn set(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::ExpenseType => &mut self.expense_type,
            FormField::ExpenseName => &mut self.name,
            FormField::Amount => &mut self.amount,
            FormField::Date => &mut self.date,
            FormField::Vat => &mut self.vat,
            FormField::Pct => &mut self.pct,
            FormField::Commentary => &mut self.commentary,
        };
        *slot = value.to_string();
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::ExpenseType => &self.expense_type,
            FormField::ExpenseName => &self.name,
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Vat => &self.vat,
            FormField::Pct => &self.pct,
            FormField::Commentary => &self.commentary,
        }
    }
}

/// ファイル入力欄
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    files: Vec<SelectedFile>,
}

impl FileInput {
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    fn select(&mut self, file: SelectedFile) {
        self.files = vec![file];
    }

    fn clear(&mut self) {
        self.files.clear();
    }
}

/// フォームの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    FileSelected,
    Submitting,
    Submitted,
    /// 送信失敗（フォームは画面に残る）
    Error(String),
}

/// ファイル選択の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCheck {
    Accepted,
    Rejected,
}

/// 送信の結果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// ファイル未選択のため送信しなかった
    Blocked,
    Submitted(Bill),
}

pub struct NewBillController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    alerter: Arc<dyn Alerter>,
    session: Arc<dyn SessionStorage>,
    form: NewBillForm,
    file_input: FileInput,
    accepted_file: Option<SelectedFile>,
    state: FormState,
}

impl NewBillController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        alerter: Arc<dyn Alerter>,
        session: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            store,
            navigator,
            alerter,
            session,
            form: NewBillForm::default(),
            file_input: FileInput::default(),
            accepted_file: None,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn form(&self) -> &NewBillForm {
        &self.form
    }

    pub fn file_input(&self) -> &FileInput {
        &self.file_input
    }

    /// 入力欄の変更
    pub fn set_field(&mut self, field: FormField, value: &str) {
        debug!("入力欄を更新: field={}", field.test_id());
        self.form.set(field, value);
    }

    /// テストIDで入力欄を変更する
    pub fn set_field_by_test_id(&mut self, test_id: &str, value: &str) -> AppResult<()> {
        let field = test_id.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    /// ファイル選択
    ///
    /// 許可されない形式の場合はアラートを表示し、入力欄を空にする
    pub fn on_file_changed(&mut self, file: SelectedFile) -> FileCheck {
        if !is_allowed_receipt(&file) {
            warn!(
                "許可されていない形式のファイルが選択されました: name={}, content_type={}",
                file.name, file.content_type
            );
            self.alerter.alert(INVALID_FORMAT_MESSAGE);
            self.file_input.clear();
            self.accepted_file = None;
            self.state = FormState::Idle;
            return FileCheck::Rejected;
        }

        info!("領収書ファイルを受け付けました: name={}", file.name);
        self.file_input.select(file.clone());
        self.accepted_file = Some(file);
        self.state = FormState::FileSelected;
        FileCheck::Accepted
    }

    /// フォーム送信
    ///
    /// create が完了してから update を送信する。どちらかが失敗した場合は
    /// そのエラーをそのまま返し、画面遷移は行わない。
    pub async fn on_submit(&mut self) -> AppResult<SubmitOutcome> {
        let Some(file) = self.accepted_file.clone() else {
            self.alerter.alert(MISSING_FILE_MESSAGE);
            return Ok(SubmitOutcome::Blocked);
        };

        let Some(store) = self.store.clone() else {
            return Err(self.fail(AppError::configuration("Store is not available")));
        };

        let email = current_user_email(self.session.as_ref())?
            .ok_or_else(|| AppError::session("Aucun utilisateur connecté"))?;
        let draft = self.prepare_update(&email)?;

        self.state = FormState::Submitting;
        info!("経費ノートの送信を開始します: file={}", file.name);

        let upload = ReceiptUpload {
            content_type: content_type_for(&file),
            file_name: file.name.clone(),
            data: file.data,
            email,
        };

        let created = match store.create(upload).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail(e)),
        };
        debug!("経費ノートを仮登録しました: id={}", created.id);

        let update = BillUpdate {
            file_url: created.file_url.clone(),
            file_name: if created.file_name.is_empty() {
                file.name
            } else {
                created.file_name.clone()
            },
            ..draft
        };

        let bill = match store.update(&created.id, update).await {
            Ok(bill) => bill,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = FormState::Submitted;
        info!("経費ノートを送信しました: id={}", bill.id);
        self.navigator.navigate(Route::Bills.path());

        Ok(SubmitOutcome::Submitted(bill))
    }

    /// フォームの値をupdateの入力に変換する（ファイル情報はcreate後に埋める）
    fn prepare_update(&self, email: &str) -> AppResult<BillUpdate> {
        let amount = parse_amount(&self.form.amount)?;
        validate_date(&self.form.date)?;

        Ok(BillUpdate {
            email: email.to_string(),
            expense_type: normalize_string(&self.form.expense_type),
            name: normalize_string(&self.form.name),
            amount,
            date: normalize_string(&self.form.date),
            vat: normalize_string(&self.form.vat),
            pct: parse_percentage(&self.form.pct),
            commentary: non_empty(&self.form.commentary),
            file_url: String::new(),
            file_name: String::new(),
            status: BillStatus::Pending,
        })
    }

    /// 送信失敗を記録する（状態には利用者向けのメッセージを残す）
    fn fail(&mut self, e: AppError) -> AppError {
        match e.severity() {
            ErrorSeverity::High => error!("経費ノートの送信に失敗しました: {}", e.details()),
            _ => warn!("経費ノートの送信に失敗しました: {}", e.details()),
        }
        self.state = FormState::Error(e.user_message().to_string());
        e
    }
}
