use chrono::NaiveDate;
use serde::Serialize;

use crate::application::ServiceDependencies;
use crate::domain::{
    self, ActiveLoan, Fine, ItemRef, LibraryItem, Loan, Money, ReturnLoanError, ReturnedLoan,
    UserId,
    commands::*,
};

use super::errors::{BorrowingError, Result};

/// 罰金支払いの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub user_id: UserId,
    /// 罰金に充当された額
    pub applied: Money,
    /// 充当しきれず返す額
    pub change: Money,
    /// 支払い後の未払い残高
    pub outstanding: Money,
    /// 支払いで変更された罰金（作成順）
    pub fines: Vec<Fine>,
}

/// 利用者の存在を確認するヘルパー関数
async fn ensure_user_exists(deps: &ServiceDependencies, user_id: &UserId) -> Result<()> {
    let user = deps
        .user_repository
        .find(user_id)
        .await
        .map_err(BorrowingError::UserRepositoryError)?;

    match user {
        Some(_) => Ok(()),
        None => Err(BorrowingError::UserNotFound(user_id.clone())),
    }
}

/// 資料をカタログに登録する
///
/// 同じ種別・識別子の資料が登録済みなら`false`。
pub async fn register_item(deps: &ServiceDependencies, item: LibraryItem) -> Result<bool> {
    let item = LibraryItem {
        available: true,
        ..item
    };

    let registered = deps
        .item_catalog
        .register(&item)
        .await
        .map_err(BorrowingError::ItemCatalogError)?;

    if registered {
        tracing::info!(item = %item.item_ref(), title = %item.title, "Item registered");
    }
    Ok(registered)
}

/// カタログの全資料を取得する
pub async fn list_items(deps: &ServiceDependencies) -> Result<Vec<LibraryItem>> {
    deps.item_catalog
        .list()
        .await
        .map_err(BorrowingError::ItemCatalogError)
}

/// 利用者の貸出中の貸出を取得する
pub async fn active_loans(deps: &ServiceDependencies, user_id: &UserId) -> Result<Vec<ActiveLoan>> {
    let loans = loan_history(deps, user_id).await?;

    Ok(loans
        .into_iter()
        .filter_map(|loan| match loan {
            Loan::Active(active) => Some(active),
            Loan::Returned(_) => None,
        })
        .collect())
}

/// 利用者の全貸出（返却済みを含む）を取得する
pub async fn loan_history(deps: &ServiceDependencies, user_id: &UserId) -> Result<Vec<Loan>> {
    deps.loan_repository
        .find_by_user(user_id)
        .await
        .map_err(BorrowingError::LoanRepositoryError)
}

/// 利用者の未払い罰金を作成順に取得する
pub async fn unpaid_fines(deps: &ServiceDependencies, user_id: &UserId) -> Result<Vec<Fine>> {
    deps.fine_repository
        .find_unpaid_for_user(user_id)
        .await
        .map_err(BorrowingError::FineRepositoryError)
}

/// 未払いの罰金があるか
pub async fn has_unpaid_fines(deps: &ServiceDependencies, user_id: &UserId) -> Result<bool> {
    Ok(!unpaid_fines(deps, user_id).await?.is_empty())
}

/// `as_of`時点で延滞中の貸出があるか
pub async fn has_overdue_items(
    deps: &ServiceDependencies,
    user_id: &UserId,
    as_of: NaiveDate,
) -> Result<bool> {
    let loans = active_loans(deps, user_id).await?;
    Ok(loans.iter().any(|loan| loan.is_overdue(as_of)))
}

/// 貸出資格の判定
///
/// 未払い罰金がなく、かつ延滞中の貸出がない場合のみtrue。
pub async fn can_borrow(
    deps: &ServiceDependencies,
    user_id: &UserId,
    as_of: NaiveDate,
) -> Result<bool> {
    if has_unpaid_fines(deps, user_id).await? {
        return Ok(false);
    }
    Ok(!has_overdue_items(deps, user_id, as_of).await?)
}

/// 資料を貸し出す
///
/// ビジネスルール：
/// - 利用者・資料が存在すること
/// - 資料が貸出可能であること
/// - 利用者に未払いの罰金がないこと
/// - 利用者に延滞中の貸出がないこと
/// - 返却期限は資料種別の貸出期間から決まる（呼び出し毎に指定しない）
///
/// いずれかの確認に失敗した場合、状態は一切変更しない。
pub async fn borrow_item(deps: &ServiceDependencies, cmd: BorrowItem) -> Result<ActiveLoan> {
    // 1. 利用者の存在確認
    ensure_user_exists(deps, &cmd.user_id).await?;

    // 2. 資料の存在・貸出可否確認
    let item = deps
        .item_catalog
        .get(&cmd.item)
        .await
        .map_err(BorrowingError::ItemCatalogError)?
        .ok_or_else(|| BorrowingError::ItemNotFound(cmd.item.clone()))?;

    if !item.available {
        tracing::warn!(item = %cmd.item, "Item is not available for loan");
        return Err(BorrowingError::ItemNotAvailable(cmd.item));
    }

    // 3. 未払い罰金の確認
    if has_unpaid_fines(deps, &cmd.user_id).await? {
        tracing::warn!(user_id = %cmd.user_id, "Borrow blocked by unpaid fines");
        return Err(BorrowingError::UserHasUnpaidFines);
    }

    // 4. 延滞の確認
    if has_overdue_items(deps, &cmd.user_id, cmd.borrowed_on).await? {
        tracing::warn!(user_id = %cmd.user_id, "Borrow blocked by overdue items");
        return Err(BorrowingError::UserHasOverdueItems);
    }

    // 5. ドメイン層の純粋関数を呼び出し
    let loan = domain::loan::open_loan(&item, cmd.user_id, cmd.borrowed_on, &deps.policy);

    // 6. 資料を確保する（同時に貸し出せるのは1件のみ）
    let reserved = deps
        .item_catalog
        .reserve(&cmd.item)
        .await
        .map_err(BorrowingError::ItemCatalogError)?;

    if !reserved {
        tracing::warn!(item = %cmd.item, "Item was lent to another user meanwhile");
        return Err(BorrowingError::ItemNotAvailable(cmd.item));
    }

    // 7. 貸出を記録。失敗したら確保を戻す
    if let Err(e) = deps.loan_repository.save(&Loan::Active(loan.clone())).await {
        release_item(deps, &cmd.item).await;
        return Err(BorrowingError::LoanRepositoryError(e));
    }

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        user_id = %loan.user_id,
        item = %loan.item,
        due_on = %loan.due_on,
        "Item borrowed"
    );

    Ok(loan)
}

/// 確保した資料を貸出可能に戻す
async fn release_item(deps: &ServiceDependencies, item: &ItemRef) {
    if let Err(e) = deps.item_catalog.set_availability(item, true).await {
        tracing::error!(item = %item, error = %e, "Failed to release reserved item");
    }
}

/// 資料を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 返却済みの貸出は`AlreadyReturned`で拒否する（再返却は状態を変更しない）
/// - 延滞していても返却は受け付ける
pub async fn return_item(deps: &ServiceDependencies, cmd: ReturnItem) -> Result<ReturnedLoan> {
    // 1. 貸出を取得
    let loan = deps
        .loan_repository
        .get_by_id(cmd.loan_id)
        .await
        .map_err(BorrowingError::LoanRepositoryError)?
        .ok_or(BorrowingError::LoanNotFound)?;

    // 2. ドメイン層の純粋関数を呼び出し
    let returned = domain::loan::return_loan(loan, cmd.returned_on).map_err(|e| match e {
        ReturnLoanError::AlreadyReturned => BorrowingError::AlreadyReturned,
    })?;

    // 3. 貸出を保存
    deps.loan_repository
        .save(&Loan::Returned(returned.clone()))
        .await
        .map_err(BorrowingError::LoanRepositoryError)?;

    // 4. 資料を貸出可能に戻す
    let updated = deps
        .item_catalog
        .set_availability(&returned.item, true)
        .await
        .map_err(BorrowingError::ItemCatalogError)?;

    if !updated {
        tracing::warn!(item = %returned.item, "Returned item is missing from the catalog");
    }

    tracing::info!(
        loan_id = %returned.loan_id.value(),
        returned_on = %returned.returned_on,
        "Item returned"
    );

    Ok(returned)
}

/// 罰金を記録する
///
/// 延滞査定の結果として外部から取り込まれる。
pub async fn record_fine(deps: &ServiceDependencies, cmd: RecordFine) -> Result<Fine> {
    ensure_user_exists(deps, &cmd.user_id).await?;

    let fine = Fine::issue(cmd.user_id, cmd.amount)
        .map_err(|_| BorrowingError::InvalidFineAmount(cmd.amount))?;

    // 未払い残高が表現できなくなる額は受け付けない
    let unpaid = unpaid_fines(deps, &fine.user_id).await?;
    let outstanding = Money::checked_sum(unpaid.iter().map(|f| f.amount));
    if outstanding.and_then(|total| total.checked_add(fine.amount)).is_none() {
        tracing::warn!(
            user_id = %fine.user_id,
            amount = %fine.amount,
            "Fine would overflow the outstanding total"
        );
        return Err(BorrowingError::InvalidFineAmount(cmd.amount));
    }

    deps.fine_repository
        .save(&fine)
        .await
        .map_err(BorrowingError::FineRepositoryError)?;

    tracing::info!(user_id = %fine.user_id, amount = %fine.amount, "Fine recorded");

    Ok(fine)
}

/// 罰金を支払う
///
/// ビジネスルール：
/// - 支払額は正であること
/// - 未払いの罰金があること
/// - 作成順に充当し、各罰金を全額支払ってから次へ進む
pub async fn pay_fine(deps: &ServiceDependencies, cmd: PayFine) -> Result<PaymentReceipt> {
    if !cmd.amount.is_positive() {
        return Err(BorrowingError::InvalidPaymentAmount(cmd.amount));
    }

    let unpaid = unpaid_fines(deps, &cmd.user_id).await?;
    if unpaid.is_empty() {
        return Err(BorrowingError::NoUnpaidFines);
    }

    let outstanding_before: Money = unpaid.iter().map(|fine| fine.amount).sum();

    let allocation = domain::fine::allocate_payment(unpaid, cmd.amount);

    deps.fine_repository
        .save_all(&allocation.updated)
        .await
        .map_err(BorrowingError::FineRepositoryError)?;

    tracing::info!(
        user_id = %cmd.user_id,
        applied = %allocation.applied,
        change = %allocation.change,
        "Fine payment allocated"
    );

    Ok(PaymentReceipt {
        user_id: cmd.user_id,
        applied: allocation.applied,
        change: allocation.change,
        outstanding: outstanding_before.saturating_sub(allocation.applied),
        fines: allocation.updated,
    })
}
