use thiserror::Error;

use crate::domain::{ItemRef, Money, UserId};

/// 貸出・罰金アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BorrowingError {
    /// 利用者が存在しない
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// 資料が存在しない
    #[error("Item not found: {0}")]
    ItemNotFound(ItemRef),

    /// 資料が貸出中
    #[error("Item is not available for loan: {0}")]
    ItemNotAvailable(ItemRef),

    /// 未払いの罰金がある
    #[error("Cannot borrow items: user has unpaid fines")]
    UserHasUnpaidFines,

    /// 延滞中の貸出がある
    #[error("Cannot borrow items: user has overdue items")]
    UserHasOverdueItems,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,

    /// 支払額が0以下
    #[error("Payment amount must be positive, got {0}")]
    InvalidPaymentAmount(Money),

    /// 罰金額が0以下
    #[error("Fine amount must be positive, got {0}")]
    InvalidFineAmount(Money),

    /// 未払いの罰金がない
    #[error("User has no unpaid fines")]
    NoUnpaidFines,

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    LoanRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// FineRepositoryのエラー
    #[error("Fine repository error")]
    FineRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ItemCatalogのエラー
    #[error("Item catalog error")]
    ItemCatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// UserRepositoryのエラー
    #[error("User repository error")]
    UserRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BorrowingError {
    /// 利用者側の状態により貸出が拒否されたか
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            BorrowingError::UserHasUnpaidFines | BorrowingError::UserHasOverdueItems
        )
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BorrowingError>;
