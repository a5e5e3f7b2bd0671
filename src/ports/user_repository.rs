use crate::domain::{User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者リポジトリポート
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 利用者を追加する
    ///
    /// 同じIDが既に存在する場合は何もせず`false`を返す。
    async fn insert(&self, user: &User) -> Result<bool>;

    /// IDで利用者を取得する
    async fn find(&self, user_id: &UserId) -> Result<Option<User>>;

    /// 利用者の登録を解除する
    ///
    /// 存在しない場合は`false`を返す。利用者の貸出・罰金の記録は削除しない。
    async fn remove(&self, user_id: &UserId) -> Result<bool>;

    /// 登録順に全利用者を取得する
    async fn list(&self) -> Result<Vec<User>>;
}
