use thiserror::Error;

use crate::application::borrowing::BorrowingError;

/// 通知アプリケーション層のエラー
///
/// チャネル個別の配信失敗はエラーにせず、ログに残して次のチャネルへ進む。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 延滞検出のエラー
    #[error("Overdue detection failed")]
    OverdueDetection(#[from] BorrowingError),

    /// UserRepositoryのエラー
    #[error("User repository error")]
    UserRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, NotificationError>;
