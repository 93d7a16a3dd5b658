// 経費ノート一覧の正規化
//
// 1件ごとに失敗しうる変換を行い、失敗したレコードは元の値のまま残す。

use super::models::Bill;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::parse_iso_date;

/// 破損データを表す日付の番兵値
pub const INVALID_DATE_SENTINEL: &str = "invalid date";

/// 1件の経費ノートを正規化する
pub trait BillNormalizer: Send + Sync {
    fn normalize(&self, bill: &Bill) -> AppResult<Bill>;
}

/// 番兵値のみを破損データとして扱う
///
/// それ以外の値は変更せずに通す
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelNormalizer;

impl BillNormalizer for SentinelNormalizer {
    fn normalize(&self, bill: &Bill) -> AppResult<Bill> {
        reject_sentinel(bill)?;
        Ok(bill.clone())
    }
}

/// ISO形式として解析できない日付を破損データとして扱う
///
/// 解析できた日付は `YYYY-MM-DD` にそろえる
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateNormalizer;

impl BillNormalizer for IsoDateNormalizer {
    fn normalize(&self, bill: &Bill) -> AppResult<Bill> {
        reject_sentinel(bill)?;

        let date = parse_iso_date(&bill.date)?;
        Ok(Bill {
            date: date.format("%Y-%m-%d").to_string(),
            ..bill.clone()
        })
    }
}

fn reject_sentinel(bill: &Bill) -> AppResult<()> {
    if bill.date.trim().eq_ignore_ascii_case(INVALID_DATE_SENTINEL) {
        return Err(AppError::validation("Invalid date format"));
    }
    Ok(())
}

/// 正規化に失敗したレコードの記録
#[derive(Debug)]
pub struct NormalizationFailure {
    /// 入力中の位置
    pub index: usize,
    /// 元のレコード
    pub bill: Bill,
    pub error: AppError,
}

/// 正規化の結果
#[derive(Debug, Default)]
pub struct NormalizedBills {
    /// 入力と同じ順序・同じ件数
    pub bills: Vec<Bill>,
    pub failures: Vec<NormalizationFailure>,
}

/// 経費ノート一覧を正規化する
///
/// 失敗したレコードは元の値のまま結果に含め、失敗内容を `failures` に記録する
pub fn normalize_bills(normalizer: &dyn BillNormalizer, bills: Vec<Bill>) -> NormalizedBills {
    let mut result = NormalizedBills {
        bills: Vec::with_capacity(bills.len()),
        failures: Vec::new(),
    };

    for (index, bill) in bills.into_iter().enumerate() {
        match normalizer.normalize(&bill) {
            Ok(normalized) => result.bills.push(normalized),
            Err(error) => {
                log::error!("{error} for {bill:?}");
                result.failures.push(NormalizationFailure {
                    index,
                    bill: bill.clone(),
                    error,
                });
                result.bills.push(bill);
            }
        }
    }

    result
}
