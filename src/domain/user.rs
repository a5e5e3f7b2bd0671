use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use super::{CredentialError, UserId};

/// 図書館利用者
///
/// 同一性は`user_id`のみで判定する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: name.into(),
            email: email.into(),
        }
    }

    /// 通知先メールアドレスがあるか
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id
    }
}

impl Eq for User {}

impl std::hash::Hash for User {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.user_id.hash(state);
    }
}

/// 管理者
///
/// パスワードは平文で保持せず、Argon2のPHC文字列として保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub username: String,
    password_hash: String,
}

impl Admin {
    /// 平文パスワードをハッシュ化して管理者を作成する
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, CredentialError> {
        let username = username.into();
        if username.trim().is_empty() || password.is_empty() {
            return Err(CredentialError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        Ok(Self {
            username,
            password_hash,
        })
    }

    /// 永続化済みのハッシュから復元する
    pub fn from_hash(
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_identity_by_external_id() {
        let a = User::new("U001", "John Doe", "john@example.com");
        let b = User::new("U001", "Johnny", "other@example.com");
        let c = User::new("U002", "John Doe", "john@example.com");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_user_has_email() {
        assert!(User::new("U001", "John", "john@example.com").has_email());
        assert!(!User::new("U001", "John", "  ").has_email());
    }

    #[test]
    fn test_admin_password_is_hashed() {
        let admin = Admin::new("admin", "s3cret").unwrap();
        assert_ne!(admin.password_hash(), "s3cret");
        assert!(admin.password_hash().starts_with("$argon2"));
    }

    #[test]
    fn test_admin_verify_password() {
        let admin = Admin::new("admin", "s3cret").unwrap();
        assert!(admin.verify_password("s3cret"));
        assert!(!admin.verify_password("wrong"));
    }

    #[test]
    fn test_admin_from_hash_round_trip() {
        let admin = Admin::new("admin", "s3cret").unwrap();
        let restored = Admin::from_hash("admin", admin.password_hash()).unwrap();
        assert!(restored.verify_password("s3cret"));
    }

    #[test]
    fn test_admin_rejects_empty_credentials() {
        assert_eq!(Admin::new("", "pw").unwrap_err(), CredentialError::Empty);
        assert_eq!(Admin::new("admin", "").unwrap_err(), CredentialError::Empty);
    }

    #[test]
    fn test_admin_from_plain_text_is_rejected() {
        assert!(matches!(
            Admin::from_hash("admin", "plain-text-password"),
            Err(CredentialError::MalformedHash(_))
        ));
    }
}
