use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ItemKind, LibraryItem, Loan, Money, User};

/// 日付依存のエンドポイント共通のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// 基準日（省略時は当日、UTC）
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    pub fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

// ============================================================================
// Users / admin
// ============================================================================

/// 利用者登録リクエスト（POST /users）
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl RegisterUserRequest {
    pub fn to_user(&self) -> User {
        User::new(&self.user_id, &self.name, &self.email)
    }
}

/// 利用者レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id.as_str().to_string(),
            name: user.name,
            email: user.email,
        }
    }
}

/// 管理者ログインリクエスト（POST /admin/login）
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// 管理者ログインレスポンス
///
/// 以後の管理者操作は`Authorization: Bearer <token>`で認証する。
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub username: String,
    pub token: String,
}

/// 貸出資格レスポンス（GET /users/:id/eligibility）
#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub user_id: String,
    pub as_of: NaiveDate,
    pub can_borrow: bool,
    pub has_unpaid_fines: bool,
    pub has_overdue_items: bool,
}

// ============================================================================
// Items
// ============================================================================

/// 資料登録リクエスト（POST /items）
///
/// `item_type`タグで種別固有のフィールド（author / artist / publisher）を選ぶ。
#[derive(Debug, Deserialize)]
pub struct RegisterItemRequest {
    pub identifier: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl RegisterItemRequest {
    pub fn into_item(self) -> LibraryItem {
        match self.kind {
            ItemKind::Book { author } => LibraryItem::book(self.identifier, self.title, author),
            ItemKind::Cd { artist } => LibraryItem::cd(self.identifier, self.title, artist),
            ItemKind::Journal { publisher } => {
                LibraryItem::journal(self.identifier, self.title, publisher)
            }
        }
    }
}

// ============================================================================
// Loans
// ============================================================================

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct BorrowItemRequest {
    pub user_id: String,
    pub item_type: String,
    pub item_id: String,
    /// 貸出日（省略時は当日）
    pub borrowed_on: Option<NaiveDate>,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub item_type: String,
    pub item_id: String,
    pub item_title: String,
    pub user_id: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: String,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let status = if loan.is_returned() { "returned" } else { "active" };
        let returned_on = loan.returned_on();
        let core = loan.core();

        Self {
            loan_id: core.loan_id.value(),
            item_type: core.item.item_type.as_str().to_string(),
            item_id: core.item.identifier.as_str().to_string(),
            item_title: core.item_title.clone(),
            user_id: core.user_id.as_str().to_string(),
            borrowed_on: core.borrowed_on,
            due_on: core.due_on,
            returned_on,
            status: status.to_string(),
        }
    }
}

/// 延滞貸出レスポンス（GET /loans/overdue）
#[derive(Debug, Serialize, Deserialize)]
pub struct OverdueLoanResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub days_overdue: i64,
    pub fine: Money,
}

// ============================================================================
// Fines / reminders
// ============================================================================

/// 金額リクエスト（罰金記録・支払い）
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: i64,
}

/// 延滞料金の試算クエリ（GET /fine-rates/:item_type）
#[derive(Debug, Default, Deserialize)]
pub struct FineQuoteQuery {
    /// 延滞日数（省略時は0）
    #[serde(default)]
    pub days: i64,
}

/// 延滞料金の試算レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct FineQuoteResponse {
    pub item_type: String,
    pub daily_rate: Money,
    pub overdue_days: i64,
    pub fine: Money,
}

/// 督促送信レスポンス（POST /reminders）
#[derive(Debug, Serialize, Deserialize)]
pub struct RemindersSentResponse {
    pub as_of: NaiveDate,
    pub notified_users: usize,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
