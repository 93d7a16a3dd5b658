// テスト用の共通フィクスチャとモック

use crate::features::bills::models::{Bill, BillStatus, BillUpdate, CreatedBill, ReceiptUpload};
use crate::features::bills::store::BillStore;
use crate::features::ui::{Alerter, ModalContent, ModalPresenter, Navigator};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// テスト用の経費ノート
pub fn sample_bill(id: &str, date: &str) -> Bill {
    Bill {
        id: id.to_string(),
        expense_type: "Hôtel et logement".to_string(),
        name: "encore".to_string(),
        amount: 400.0,
        date: date.to_string(),
        vat: "80".to_string(),
        pct: Some(20),
        commentary: Some("séminaire billed".to_string()),
        file_url: format!("https://test.storage.tld/bills/{id}.jpg"),
        file_name: "preview-facture-free-201801-pdf-1.jpg".to_string(),
        status: BillStatus::Pending,
        comment_admin: None,
        email: "a@a".to_string(),
    }
}

/// 仮登録された経費ノートに対するupdate入力
pub fn sample_update(created: &CreatedBill) -> BillUpdate {
    BillUpdate {
        email: "employee@test.tld".to_string(),
        expense_type: "Transports".to_string(),
        name: "Train ticket".to_string(),
        amount: 50.0,
        date: "2024-07-04".to_string(),
        vat: "10".to_string(),
        pct: 20,
        commentary: None,
        file_url: created.file_url.clone(),
        file_name: created.file_name.clone(),
        status: BillStatus::Pending,
    }
}

/// Storeへの呼び出し記録
#[derive(Debug, Clone)]
pub enum StoreCall {
    List,
    Create(ReceiptUpload),
    Update(String, BillUpdate),
}

/// 呼び出し順を記録するStore
///
/// create は常に id=1234 の経費ノートを返す
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BillStore for RecordingStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        self.record(StoreCall::List);
        Ok(Vec::new())
    }

    async fn create(&self, upload: ReceiptUpload) -> AppResult<CreatedBill> {
        let created = CreatedBill {
            id: "1234".to_string(),
            file_url: format!("https://test.storage.tld/{}", upload.file_name),
            file_name: upload.file_name.clone(),
        };
        self.record(StoreCall::Create(upload));
        Ok(created)
    }

    async fn update(&self, id: &str, update: BillUpdate) -> AppResult<Bill> {
        self.record(StoreCall::Update(id.to_string(), update.clone()));
        Ok(update.into_bill(id.to_string()))
    }
}

/// 失敗を返すStore
///
/// `new` はすべての操作が失敗し、`failing_update` は update のみ失敗する
pub struct FailingStore {
    message: String,
    create_succeeds: bool,
    update_calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            create_succeeds: false,
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_update(message: &str) -> Self {
        Self {
            create_succeeds: true,
            ..Self::new(message)
        }
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn error(&self) -> AppError {
        AppError::ExternalService(self.message.clone())
    }
}

#[async_trait]
impl BillStore for FailingStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        Err(self.error())
    }

    async fn create(&self, upload: ReceiptUpload) -> AppResult<CreatedBill> {
        if !self.create_succeeds {
            return Err(self.error());
        }
        Ok(CreatedBill {
            id: "1234".to_string(),
            file_url: format!("https://test.storage.tld/{}", upload.file_name),
            file_name: upload.file_name,
        })
    }

    async fn update(&self, _id: &str, _update: BillUpdate) -> AppResult<Bill> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }
}

/// 遷移先を記録するNavigator
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, pathname: &str) {
        self.paths.lock().unwrap().push(pathname.to_string());
    }
}

/// 表示内容を記録するモーダル
pub struct RecordingModal {
    width: u32,
    shown: Mutex<Vec<ModalContent>>,
}

impl RecordingModal {
    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<ModalContent> {
        self.shown.lock().unwrap().clone()
    }
}

impl ModalPresenter for RecordingModal {
    fn width(&self) -> u32 {
        self.width
    }

    fn show(&self, content: ModalContent) {
        self.shown.lock().unwrap().push(content);
    }
}

/// アラートを記録するAlerter
#[derive(Default)]
pub struct RecordingAlerter {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// 記録されたログ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLog {
    pub level: log::Level,
    pub message: String,
}

/// ログをスレッドごとに記録するロガー
struct CaptureLogger;

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;
static INSTALL_CAPTURE_LOGGER: Once = Once::new();

thread_local! {
    static CAPTURED_LOGS: RefCell<Vec<CapturedLog>> = RefCell::new(Vec::new());
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let _ = CAPTURED_LOGS.try_with(|logs| {
            logs.borrow_mut().push(CapturedLog {
                level: record.level(),
                message: record.args().to_string(),
            })
        });
    }

    fn flush(&self) {}
}

/// 現在のスレッドでログの記録を開始する
///
/// 非同期テストは `#[tokio::test]`（current_thread）で実行すること
pub fn start_log_capture() {
    INSTALL_CAPTURE_LOGGER.call_once(|| {
        log::set_logger(&CAPTURE_LOGGER).expect("テスト用ロガーの設定に失敗しました");
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED_LOGS.with(|logs| logs.borrow_mut().clear());
}

/// 現在のスレッドで記録された、指定レベルのログメッセージ
pub fn captured_logs(level: log::Level) -> Vec<String> {
    CAPTURED_LOGS.with(|logs| {
        logs.borrow()
            .iter()
            .filter(|log| log.level == level)
            .map(|log| log.message.clone())
            .collect()
    })
}

/// リクエストヘッダーの終わりまで読み取る
async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
}

/// 接続ごとに同じJSONを返すHTTPサーバーを起動し、ベースURLを返す
pub async fn spawn_json_server(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request_head(&mut socket).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// リクエストを受け取った後、応答せずに切断するHTTPサーバーを起動する
///
/// ベースURLと受け付けた接続数のカウンターを返す
pub async fn spawn_dropping_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            read_request_head(&mut socket).await;
            drop(socket);
        }
    });

    (format!("http://{addr}"), accepted)
}
