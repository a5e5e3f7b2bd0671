use crate::domain::User;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知チャネルポート（オブザーバー）
///
/// 実装はメール、SMS、プッシュ通知などが考えられる。
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// チャネル種別（ログ出力用）
    fn channel_type(&self) -> &'static str;

    /// 利用者にメッセージを届ける
    ///
    /// `Ok`のときのみ配信成功とみなす。
    async fn notify(&self, user: &User, message: &str) -> Result<()>;
}
