use crate::domain::{
    ActiveLoan, ItemId, ItemRef, ItemType, Loan, LoanCore, LoanId, ReturnedLoan, UserId,
};
use crate::ports::loan_repository::{LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_LOANS: &str = r#"
    SELECT
        loan_id,
        item_type,
        item_identifier,
        item_title,
        user_id,
        borrow_date,
        due_date,
        return_date
    FROM loans
"#;

/// PostgreSQLの行データをLoanに変換する
///
/// item_typeが未知のタグの場合はエラーにする（書籍扱いにはしない）。
/// return_dateの有無で貸出中・返却済みを復元する。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let item_type_str: &str = row.get("item_type");
    let item_type = ItemType::from_str(item_type_str)?;

    let core = LoanCore {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        item: ItemRef::new(item_type, ItemId::new(row.get::<String, _>("item_identifier"))),
        item_title: row.get("item_title"),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        borrowed_on: row.get("borrow_date"),
        due_on: row.get("due_date"),
    };

    let returned_on: Option<NaiveDate> = row.get("return_date");
    Ok(match returned_on {
        Some(returned_on) => Loan::Returned(ReturnedLoan { core, returned_on }),
        None => Loan::Active(ActiveLoan { core }),
    })
}

/// LoanRepositoryのPostgreSQL実装
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 貸出を保存（upsert）
    ///
    /// 更新されるのは返却日のみ。返却期限は作成時の値を保持する。
    async fn save(&self, loan: &Loan) -> Result<()> {
        let core = loan.core();

        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                item_type,
                item_identifier,
                item_title,
                user_id,
                borrow_date,
                due_date,
                return_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (loan_id)
            DO UPDATE SET
                return_date = EXCLUDED.return_date
            "#,
        )
        .bind(core.loan_id.value())
        .bind(core.item.item_type.as_str())
        .bind(core.item.identifier.as_str())
        .bind(&core.item_title)
        .bind(core.user_id.as_str())
        .bind(core.borrowed_on)
        .bind(core.due_on)
        .bind(loan.returned_on())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("{} WHERE loan_id = $1", SELECT_LOANS))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 ORDER BY seq ASC",
            SELECT_LOANS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!("{} ORDER BY seq ASC", SELECT_LOANS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
