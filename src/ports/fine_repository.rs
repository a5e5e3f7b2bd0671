use crate::domain::{Fine, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 罰金リポジトリポート
#[async_trait]
pub trait FineRepository: Send + Sync {
    /// 罰金を保存する（upsert）
    ///
    /// 新規の罰金は作成順の末尾に追加される。
    async fn save(&self, fine: &Fine) -> Result<()>;

    /// 複数の罰金をまとめて保存する
    ///
    /// 全件が保存されるか、1件も保存されないかのどちらか。
    async fn save_all(&self, fines: &[Fine]) -> Result<()>;

    /// 利用者の未払い罰金を作成順に取得する
    ///
    /// 支払い配分はこの順序に従う。
    async fn find_unpaid_for_user(&self, user_id: &UserId) -> Result<Vec<Fine>>;

    /// 利用者の全罰金を作成順に取得する
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Fine>>;
}
