use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ItemRef, LoanId, Money, UserId};

/// コマンド：資料を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowItem {
    pub user_id: UserId,
    pub item: ItemRef,
    pub borrowed_on: NaiveDate,
}

/// コマンド：資料を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub loan_id: LoanId,
    pub returned_on: NaiveDate,
}

/// コマンド：罰金を支払う
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFine {
    pub user_id: UserId,
    pub amount: Money,
}

/// コマンド：罰金を記録する（延滞査定の結果を取り込む）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFine {
    pub user_id: UserId,
    pub amount: Money,
}
