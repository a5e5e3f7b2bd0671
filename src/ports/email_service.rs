use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// メール送信ポート
///
/// 通知処理が依存するのはこの契約のみ。SMTPかモックかは問わない。
#[async_trait]
pub trait EmailService: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}
