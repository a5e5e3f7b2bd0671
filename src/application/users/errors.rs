use thiserror::Error;

use crate::domain::{CredentialError, UserId};

/// 利用者管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum UserManagementError {
    /// 管理者がログインしていない
    #[error("Admin must be logged in to unregister users")]
    AdminNotAuthenticated,

    /// 貸出中の資料がある
    #[error("Cannot unregister user {0}: user has active loans")]
    UserHasActiveLoans(UserId),

    /// 未払いの罰金がある
    #[error("Cannot unregister user {0}: user has unpaid fines")]
    UserHasUnpaidFines(UserId),

    /// 利用者IDが空
    #[error("User id must not be empty")]
    InvalidUserId,

    /// 管理者の資格情報が不正
    #[error("Invalid admin credentials: {0}")]
    InvalidCredentials(#[from] CredentialError),

    /// UserRepositoryのエラー
    #[error("User repository error")]
    UserRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// AdminRepositoryのエラー
    #[error("Admin repository error")]
    AdminRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    LoanRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// FineRepositoryのエラー
    #[error("Fine repository error")]
    FineRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, UserManagementError>;
