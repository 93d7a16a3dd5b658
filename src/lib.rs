// 機能モジュール構造
pub mod features;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use features::bills::{
    Bill, BillStatus, BillStore, BillsListController, FormState, NewBillController,
    SubmitOutcome,
};
pub use features::routes::Route;
pub use shared::config::initialization::{initialize_application, InitializationResult};
pub use shared::errors::{AppError, AppResult};
