use crate::domain::Admin;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 管理者リポジトリポート
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// 管理者を保存する（ユーザー名で一意、既存ならハッシュを更新）
    async fn save(&self, admin: &Admin) -> Result<()>;

    /// ユーザー名で管理者を取得する
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>>;
}
