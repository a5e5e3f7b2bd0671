use crate::domain::{Fine, FineId, Money, UserId};
use crate::ports::fine_repository::{FineRepository as FineRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Row,
    postgres::{PgArguments, PgRow},
    query::Query,
};

fn map_row_to_fine(row: &PgRow) -> Fine {
    Fine {
        fine_id: FineId::from_uuid(row.get("fine_id")),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        amount: Money::new(row.get("amount")),
        paid: row.get("paid"),
    }
}

fn upsert_fine(fine: &Fine) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO fines (fine_id, user_id, amount, paid)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (fine_id)
        DO UPDATE SET
            amount = EXCLUDED.amount,
            paid = EXCLUDED.paid
        "#,
    )
    .bind(fine.fine_id.value())
    .bind(fine.user_id.as_str())
    .bind(fine.amount.value())
    .bind(fine.paid)
}

/// FineRepositoryのPostgreSQL実装
///
/// seq列（BIGSERIAL）で作成順を保持する。
pub struct FineRepository {
    pool: PgPool,
}

impl FineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FineRepositoryTrait for FineRepository {
    async fn save(&self, fine: &Fine) -> Result<()> {
        upsert_fine(fine).execute(&self.pool).await?;
        Ok(())
    }

    /// 1トランザクションで保存し、途中で失敗すればロールバックする
    async fn save_all(&self, fines: &[Fine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for fine in fines {
            upsert_fine(fine).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_unpaid_for_user(&self, user_id: &UserId) -> Result<Vec<Fine>> {
        let rows = sqlx::query(
            r#"
            SELECT fine_id, user_id, amount, paid
            FROM fines
            WHERE user_id = $1 AND paid = FALSE
            ORDER BY seq ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_fine).collect())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Fine>> {
        let rows = sqlx::query(
            r#"
            SELECT fine_id, user_id, amount, paid
            FROM fines
            WHERE user_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_fine).collect())
    }
}
