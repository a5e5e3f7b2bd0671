use crate::domain::{Loan, LoanId, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出リポジトリポート
///
/// 貸出は作成後に返却で1度だけ更新され、削除されない。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出の現在状態を保存する
    ///
    /// 新規の場合はINSERT、既存の場合はUPDATE（upsert）。
    async fn save(&self, loan: &Loan) -> Result<()>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 利用者の全貸出を貸出順に取得する
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>>;

    /// 全貸出を貸出順に取得する
    ///
    /// 延滞検出の走査に使用される。
    async fn find_all(&self) -> Result<Vec<Loan>>;
}
