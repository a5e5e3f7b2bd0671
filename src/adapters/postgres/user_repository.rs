use crate::domain::{User, UserId};
use crate::ports::user_repository::{Result, UserRepository as UserRepositoryTrait};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_user(row: &PgRow) -> User {
    User {
        user_id: UserId::new(row.get::<String, _>("user_id")),
        name: row.get("name"),
        email: row.get("email"),
    }
}

/// UserRepositoryのPostgreSQL実装
///
/// 登録解除は`unregistered_at`を立てる論理削除。貸出・罰金の行はそのまま残る。
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    /// 利用者を追加（登録中のIDと重複すればfalse）
    ///
    /// 登録解除済みのIDは再登録でき、登録順の末尾に移る。
    async fn insert(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
                seq = DEFAULT,
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                created_at = NOW(),
                unregistered_at = NULL
            WHERE users.unregistered_at IS NOT NULL
            "#,
        )
        .bind(user.user_id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT user_id, name, email FROM users \
             WHERE user_id = $1 AND unregistered_at IS NULL",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET unregistered_at = NOW() \
             WHERE user_id = $1 AND unregistered_at IS NULL",
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT user_id, name, email FROM users \
             WHERE unregistered_at IS NULL ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_user).collect())
    }
}
