// 経費ノート機能モジュール
pub mod api_store;
pub mod file_validation;
pub mod list;
pub mod memory_store;
pub mod models;
pub mod new_bill;
pub mod normalizer;
pub mod store;

pub use list::{BillsListController, FetchDiagnostic, FetchReport};
pub use models::{Bill, BillStatus, BillUpdate, CreatedBill, ReceiptUpload};
pub use new_bill::{FileCheck, FormField, FormState, NewBillController, SubmitOutcome};
pub use store::BillStore;
