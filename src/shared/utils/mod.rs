use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate};

pub mod nanoid;

/// TVA（pct）が未入力の場合に使う既定値
pub const DEFAULT_VAT_PERCENTAGE: u32 = 20;

/// ISO形式の日付文字列を解析する
///
/// # 受け付ける形式
/// - `YYYY-MM-DD`
/// - RFC3339の日時（日付部分のみを使用）
pub fn parse_iso_date(date_str: &str) -> AppResult<NaiveDate> {
    let trimmed = date_str.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|datetime| datetime.date_naive())
        .map_err(|_| AppError::validation(format!("Date invalide: {date_str}")))
}

/// 日付文字列のバリデーション
///
/// # バリデーション規則
/// - ISO形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<()> {
    let date = parse_iso_date(date_str)?;

    let year = date.year();
    if !(1900..=2100).contains(&year) {
        return Err(AppError::validation(
            "La date doit être comprise entre 1900 et 2100",
        ));
    }

    Ok(())
}

/// フォーム入力の金額を解析する
///
/// # バリデーション規則
/// - 数値として解析できること
/// - 有限の正の数値であること
pub fn parse_amount(amount_str: &str) -> AppResult<f64> {
    let amount: f64 = amount_str
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| AppError::validation(format!("Montant invalide: {amount_str}")))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation(format!(
            "Montant invalide: {amount_str}"
        )));
    }

    Ok(amount)
}

/// フォーム入力のTVA率を解析する
///
/// 未入力または数値でない場合は既定値（20）になる
pub fn parse_percentage(pct_str: &str) -> u32 {
    match pct_str.trim().parse::<u32>() {
        Ok(pct) if pct > 0 => pct,
        _ => DEFAULT_VAT_PERCENTAGE,
    }
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 空文字列をNoneにする
pub fn non_empty(text: &str) -> Option<String> {
    let normalized = normalize_string(text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
