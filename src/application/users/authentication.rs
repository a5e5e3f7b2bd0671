use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::application::ServiceDependencies;
use crate::domain::Admin;

use super::errors::{Result, UserManagementError};

/// 管理者セッションのトークン
///
/// ログイン毎に発行され、ログアウトで失効する。
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ログに残らないよう値は伏せる
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// 管理者のログイン状態
///
/// クライアント毎に発行したトークンで管理する。
/// あるクライアントのログインは他のクライアントに権限を与えない。
#[derive(Debug, Default)]
pub struct AdminSession {
    sessions: Mutex<HashMap<SessionToken, String>>,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 管理者としてログインする
    ///
    /// 保存されたArgon2ハッシュで照合し、一致すれば新しいトークンを返す。
    /// 一致しなければ`None`で、既存のセッションは変更しない。
    pub async fn login(
        &self,
        deps: &ServiceDependencies,
        username: &str,
        password: &str,
    ) -> Result<Option<SessionToken>> {
        let admin = deps
            .admin_repository
            .find_by_username(username)
            .await
            .map_err(UserManagementError::AdminRepositoryError)?;

        let verified = admin.is_some_and(|admin| admin.verify_password(password));
        if !verified {
            tracing::warn!(username, "Admin login rejected");
            return Ok(None);
        }

        let token = SessionToken::generate();
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), username.to_string());

        tracing::info!(username, "Admin logged in");
        Ok(Some(token))
    }

    /// トークンを失効させる
    ///
    /// 有効なトークンでなければ`false`。
    pub fn logout(&self, token: &SessionToken) -> bool {
        let previous = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);

        match previous {
            Some(username) => {
                tracing::info!(username, "Admin logged out");
                true
            }
            None => false,
        }
    }

    pub fn is_logged_in(&self, token: &SessionToken) -> bool {
        self.current_admin(token).is_some()
    }

    /// トークンに対応する管理者名
    pub fn current_admin(&self, token: &SessionToken) -> Option<String> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// 起動時に管理者アカウントを用意する
///
/// 既存のアカウントはパスワードハッシュを更新する。
pub async fn provision_admin(
    deps: &ServiceDependencies,
    username: &str,
    password: &str,
) -> Result<Admin> {
    let admin = Admin::new(username, password)?;

    deps.admin_repository
        .save(&admin)
        .await
        .map_err(UserManagementError::AdminRepositoryError)?;

    tracing::info!(username, "Admin account provisioned");
    Ok(admin)
}
