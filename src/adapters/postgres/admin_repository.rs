use crate::domain::Admin;
use crate::ports::admin_repository::{AdminRepository as AdminRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// AdminRepositoryのPostgreSQL実装
///
/// パスワードはArgon2ハッシュのみを保存する。
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepositoryTrait for AdminRepository {
    async fn save(&self, admin: &Admin) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admins (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username)
            DO UPDATE SET password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(&admin.username)
        .bind(admin.password_hash())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 保存されたハッシュが不正な場合はエラー
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let row = sqlx::query("SELECT username, password_hash FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let admin = Admin::from_hash(
                    row.get::<String, _>("username"),
                    row.get::<String, _>("password_hash"),
                )?;
                Ok(Some(admin))
            }
            None => Ok(None),
        }
    }
}
