use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::application::ServiceDependencies;
use crate::domain::{ActiveLoan, ItemType, LibraryPolicy, Loan, Money, UserId};

use super::errors::{BorrowingError, Result};

/// 種別ごとの延滞集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeOverdueSummary {
    pub count: usize,
    pub total_fine: Money,
}

/// 利用者の延滞レポート（書籍・CD・雑誌の混在）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixedMediaReport {
    pub user_id: UserId,
    pub report_date: NaiveDate,
    pub total_items: usize,
    pub total_fine: Money,
    pub by_type: BTreeMap<ItemType, TypeOverdueSummary>,
}

/// 延滞中の貸出を抽出する
fn collect_overdue(loans: Vec<Loan>, as_of: NaiveDate) -> Vec<ActiveLoan> {
    loans
        .into_iter()
        .filter_map(|loan| match loan {
            Loan::Active(active) if active.is_overdue(as_of) => Some(active),
            _ => None,
        })
        .collect()
}

/// `as_of`時点で延滞中の全貸出（貸出順）
pub async fn overdue_loans(deps: &ServiceDependencies, as_of: NaiveDate) -> Result<Vec<ActiveLoan>> {
    let loans = deps
        .loan_repository
        .find_all()
        .await
        .map_err(BorrowingError::LoanRepositoryError)?;

    Ok(collect_overdue(loans, as_of))
}

/// `as_of`時点で延滞中の利用者の貸出
pub async fn overdue_loans_for_user(
    deps: &ServiceDependencies,
    user_id: &UserId,
    as_of: NaiveDate,
) -> Result<Vec<ActiveLoan>> {
    let loans = deps
        .loan_repository
        .find_by_user(user_id)
        .await
        .map_err(BorrowingError::LoanRepositoryError)?;

    Ok(collect_overdue(loans, as_of))
}

/// 貸出1件の延滞料金（純粋な関数）
///
/// 資料種別の料金率 × 延滞日数。延滞していなければ0。
pub fn fine_for(policy: &LibraryPolicy, loan: &Loan, as_of: NaiveDate) -> Money {
    match loan {
        Loan::Active(active) => policy
            .fine_rate(active.item.item_type)
            .calculate_fine(active.days_overdue(as_of)),
        Loan::Returned(_) => Money::ZERO,
    }
}

/// 利用者の延滞を種別ごとに集計する
///
/// 集計のみで状態は変更しない。
pub async fn mixed_media_report(
    deps: &ServiceDependencies,
    user_id: &UserId,
    as_of: NaiveDate,
) -> Result<MixedMediaReport> {
    let overdue = overdue_loans_for_user(deps, user_id, as_of).await?;

    let mut by_type: BTreeMap<ItemType, TypeOverdueSummary> = BTreeMap::new();
    for loan in &overdue {
        let item_type = loan.item.item_type;
        let fine = deps
            .policy
            .fine_rate(item_type)
            .calculate_fine(loan.days_overdue(as_of));

        let summary = by_type.entry(item_type).or_default();
        summary.count += 1;
        summary.total_fine += fine;
    }

    Ok(MixedMediaReport {
        user_id: user_id.clone(),
        report_date: as_of,
        total_items: overdue.len(),
        total_fine: by_type.values().map(|summary| summary.total_fine).sum(),
        by_type,
    })
}
