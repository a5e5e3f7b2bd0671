use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::User;
use crate::ports::{
    EmailService,
    notification_channel::{NotificationChannel, Result},
};

/// 件名を指定しない通知の既定件名
pub const DEFAULT_SUBJECT: &str = "Library Notification";

/// メール通知チャネル
///
/// `EmailService`ポート経由で利用者のアドレスへ送信する。
pub struct EmailNotifier {
    email_service: Arc<dyn EmailService>,
    default_subject: String,
}

impl EmailNotifier {
    pub fn new(email_service: Arc<dyn EmailService>) -> Self {
        Self::with_subject(email_service, DEFAULT_SUBJECT)
    }

    pub fn with_subject(email_service: Arc<dyn EmailService>, subject: impl Into<String>) -> Self {
        Self {
            email_service,
            default_subject: subject.into(),
        }
    }

    pub fn default_subject(&self) -> &str {
        &self.default_subject
    }

    /// 件名を指定して通知する
    pub async fn notify_with_subject(&self, user: &User, subject: &str, message: &str) -> Result<()> {
        if !user.has_email() {
            return Err(format!("User {} has no email address", user.user_id).into());
        }
        self.email_service
            .send_email(&user.email, subject, message)
            .await
    }
}

#[async_trait]
impl NotificationChannel for EmailNotifier {
    fn channel_type(&self) -> &'static str {
        "Email"
    }

    async fn notify(&self, user: &User, message: &str) -> Result<()> {
        self.notify_with_subject(user, &self.default_subject, message)
            .await
    }
}
