use chrono::NaiveDate;
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::ServiceDependencies;
use crate::application::borrowing::{overdue_loans, overdue_loans_for_user};
use crate::domain::{User, UserId};
use crate::ports::NotificationChannel;

use super::errors::{NotificationError, Result};

/// 督促メッセージを組み立てる
///
/// 1件のときのみ単数形。
pub fn build_reminder_message(overdue_count: usize) -> String {
    if overdue_count == 1 {
        "You have 1 overdue book.".to_string()
    } else {
        format!("You have {} overdue book(s).", overdue_count)
    }
}

/// 延滞督促の配信サービス（オブザーバーパターンのSubject）
///
/// 登録されたチャネルへ登録順に配信する。
/// あるチャネルの失敗は他のチャネルの配信を妨げない。
pub struct NotificationService {
    deps: ServiceDependencies,
    channels: Mutex<Vec<Arc<dyn NotificationChannel>>>,
}

impl NotificationService {
    pub fn new(deps: ServiceDependencies) -> Self {
        Self {
            deps,
            channels: Mutex::new(Vec::new()),
        }
    }

    pub fn with_channel(deps: ServiceDependencies, channel: Arc<dyn NotificationChannel>) -> Self {
        let service = Self::new(deps);
        service.attach(channel);
        service
    }

    /// チャネルを登録する
    ///
    /// 同一インスタンスの二重登録は無視し、`false`を返す。
    pub fn attach(&self, channel: Arc<dyn NotificationChannel>) -> bool {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if channels.iter().any(|c| same_channel(c, &channel)) {
            return false;
        }
        tracing::debug!(channel = channel.channel_type(), "Notification channel attached");
        channels.push(channel);
        true
    }

    /// チャネルの登録を解除する
    pub fn detach(&self, channel: &Arc<dyn NotificationChannel>) -> bool {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let before = channels.len();
        channels.retain(|c| !same_channel(c, channel));
        channels.len() != before
    }

    pub fn channel_count(&self) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 配信中にロックを保持しないよう、登録済みチャネルを複製して返す
    fn snapshot(&self) -> Vec<Arc<dyn NotificationChannel>> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 全チャネルへ配信する
    ///
    /// 1つ以上のチャネルで成功すればtrue。
    pub async fn notify_channels(&self, user: &User, message: &str) -> bool {
        let mut delivered = false;
        for channel in self.snapshot() {
            match channel.notify(user, message).await {
                Ok(()) => delivered = true,
                Err(e) => {
                    tracing::warn!(
                        channel = channel.channel_type(),
                        user_id = %user.user_id,
                        error = %e,
                        "Notification channel failed"
                    );
                }
            }
        }
        delivered
    }

    /// 利用者1人へ延滞督促を送る
    ///
    /// 延滞がない、または利用者が見つからない場合はfalse。
    pub async fn send_reminder_to_user(&self, user_id: &UserId, as_of: NaiveDate) -> Result<bool> {
        let overdue = overdue_loans_for_user(&self.deps, user_id, as_of).await?;
        if overdue.is_empty() {
            return Ok(false);
        }

        let Some(user) = self.find_user(user_id).await? else {
            return Ok(false);
        };

        let message = build_reminder_message(overdue.len());
        Ok(self.notify_channels(&user, &message).await)
    }

    /// 延滞中の全利用者へ督促を送る
    ///
    /// # 戻り値
    /// 1つ以上のチャネルで配信に成功した利用者数
    pub async fn send_overdue_reminders(&self, as_of: NaiveDate) -> Result<usize> {
        let overdue = overdue_loans(&self.deps, as_of).await?;

        // 利用者ごとの延滞件数（初出順）
        let mut counts: Vec<(UserId, usize)> = Vec::new();
        for loan in &overdue {
            match counts.iter_mut().find(|(id, _)| *id == loan.user_id) {
                Some((_, count)) => *count += 1,
                None => counts.push((loan.user_id.clone(), 1)),
            }
        }

        let mut notified = 0;
        for (user_id, count) in counts {
            let Some(user) = self.find_user(&user_id).await? else {
                continue;
            };

            let message = build_reminder_message(count);
            if self.notify_channels(&user, &message).await {
                notified += 1;
            }
        }

        tracing::info!(as_of = %as_of, notified, "Overdue reminders sent");

        Ok(notified)
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let user = self
            .deps
            .user_repository
            .find(user_id)
            .await
            .map_err(NotificationError::UserRepositoryError)?;

        if user.is_none() {
            tracing::warn!(user_id = %user_id, "Overdue loan belongs to an unknown user");
        }
        Ok(user)
    }
}

fn same_channel(a: &Arc<dyn NotificationChannel>, b: &Arc<dyn NotificationChannel>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
