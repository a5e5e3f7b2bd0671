use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{ItemRef, LibraryItem, LibraryPolicy, LoanId, ReturnLoanError, UserId};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Loan集約の共通フィールド
///
/// 貸出中・返却済みの両状態で共有される。資料そのものは保持せず、
/// 種別・識別子・タイトルを非正規化して持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCore {
    pub loan_id: LoanId,

    // 他の集約への参照
    pub item: ItemRef,
    pub item_title: String,
    pub user_id: UserId,

    // 返却期限は作成時に確定し、以後再計算しない
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
}

/// 貸出中状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLoan {
    #[serde(flatten)]
    pub core: LoanCore,
}

impl std::ops::Deref for ActiveLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl ActiveLoan {
    /// `as_of > 返却期限` のときtrue
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        as_of > self.due_on
    }

    /// 延滞日数（延滞していなければ0）
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        if !self.is_overdue(as_of) {
            return 0;
        }
        (as_of - self.due_on).num_days()
    }
}

/// 返却済み状態（終端）
///
/// returned_onが必須（型で保証）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub returned_on: NaiveDate,
}

impl std::ops::Deref for ReturnedLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Loan集約
///
/// Active → Returned の一方向のみ遷移する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Loan {
    Active(ActiveLoan),
    Returned(ReturnedLoan),
}

impl Loan {
    pub fn core(&self) -> &LoanCore {
        match self {
            Loan::Active(active) => &active.core,
            Loan::Returned(returned) => &returned.core,
        }
    }

    pub fn loan_id(&self) -> LoanId {
        self.core().loan_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.core().user_id
    }

    pub fn returned_on(&self) -> Option<NaiveDate> {
        match self {
            Loan::Active(_) => None,
            Loan::Returned(returned) => Some(returned.returned_on),
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, Loan::Returned(_))
    }

    /// 貸出中の場合のみ取り出す
    pub fn as_active(&self) -> Option<&ActiveLoan> {
        match self {
            Loan::Active(active) => Some(active),
            Loan::Returned(_) => None,
        }
    }
}

impl From<ActiveLoan> for Loan {
    fn from(loan: ActiveLoan) -> Self {
        Loan::Active(loan)
    }
}

impl From<ReturnedLoan> for Loan {
    fn from(loan: ReturnedLoan) -> Self {
        Loan::Returned(loan)
    }
}

/// 純粋関数：資料を貸し出す
///
/// ビジネスルール：
/// - 返却期限 = 貸出日 + 資料種別の貸出期間（書籍28日、CD7日、雑誌14日）
/// - 状態はActive
///
/// 貸出可否の判定はアプリケーション層で行う。副作用なし。
pub fn open_loan(
    item: &LibraryItem,
    user_id: UserId,
    borrowed_on: NaiveDate,
    policy: &LibraryPolicy,
) -> ActiveLoan {
    let period = policy.loan_period_days(item.item_type());
    let due_on = borrowed_on + Duration::days(i64::from(period));

    ActiveLoan {
        core: LoanCore {
            loan_id: LoanId::new(),
            item: item.item_ref(),
            item_title: item.title.clone(),
            user_id,
            borrowed_on,
            due_on,
        },
    }
}

/// 純粋関数：資料を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 返却済みの貸出は再返却できない
pub fn return_loan(loan: Loan, returned_on: NaiveDate) -> Result<ReturnedLoan, ReturnLoanError> {
    match loan {
        Loan::Active(active) => Ok(ReturnedLoan {
            core: active.core,
            returned_on,
        }),
        Loan::Returned(_) => Err(ReturnLoanError::AlreadyReturned),
    }
}

/// 純粋関数：延滞判定
///
/// 貸出中かつ `as_of > 返却期限` のときのみtrue。
pub fn is_overdue(loan: &Loan, as_of: NaiveDate) -> bool {
    match loan {
        Loan::Active(active) => active.is_overdue(as_of),
        Loan::Returned(_) => false,
    }
}

/// 純粋関数：延滞日数
///
/// 延滞していなければ0。
pub fn days_overdue(loan: &Loan, as_of: NaiveDate) -> i64 {
    match loan {
        Loan::Active(active) => active.days_overdue(as_of),
        Loan::Returned(_) => 0,
    }
}
