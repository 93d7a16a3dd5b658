/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・コントローラー・データアクセスを含む。
pub mod bills;
pub mod routes;
pub mod session;
pub mod ui;
