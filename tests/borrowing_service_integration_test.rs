use library_circulation::application::borrowing::{
    BorrowingError, active_loans, borrow_item, can_borrow, has_overdue_items, has_unpaid_fines,
    list_items, loan_history, mixed_media_report, overdue_loans, pay_fine, record_fine,
    register_item, return_item, unpaid_fines,
};
use async_trait::async_trait;
use library_circulation::adapters::memory;
use library_circulation::application::ServiceDependencies;
use library_circulation::domain::commands::*;
use library_circulation::domain::*;
use library_circulation::ports::{self, FineRepository as _, ItemCatalog as _, LoanRepository as _};
use std::sync::Arc;

mod common;
use common::{TestContext, day, dune, kind_of_blue, nature};

fn borrow(user_id: &str, item: &LibraryItem, on: chrono::NaiveDate) -> BorrowItem {
    BorrowItem {
        user_id: UserId::new(user_id),
        item: item.item_ref(),
        borrowed_on: on,
    }
}

async fn record(ctx: &TestContext, user_id: &str, amount: i64) -> Fine {
    record_fine(
        &ctx.deps,
        RecordFine {
            user_id: UserId::new(user_id),
            amount: Money::new(amount),
        },
    )
    .await
    .unwrap()
}

async fn is_available(ctx: &TestContext, item: &LibraryItem) -> bool {
    ctx.catalog
        .get(&item.item_ref())
        .await
        .unwrap()
        .unwrap()
        .available
}

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_borrow_book_success() {
    // Arrange
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());

    // Act
    let loan = borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();

    // Assert: 返却期限は28日後、資料は貸出中
    assert_eq!(loan.due_on, day(28));
    assert_eq!(loan.item, book.item_ref());
    assert!(!is_available(&ctx, &book).await);
    assert_eq!(ctx.loans.len(), 1);
}

#[tokio::test]
async fn test_borrow_cd_due_in_7_days() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let cd = ctx.add_item(kind_of_blue());

    let loan = borrow_item(&ctx.deps, borrow("U001", &cd, day(5)))
        .await
        .unwrap();

    assert_eq!(loan.due_on, day(12));
}

#[tokio::test]
async fn test_borrow_unavailable_item_fails_without_mutation() {
    // Arrange: U001が既に借りている
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    ctx.add_user("U002", "Jane Roe", "jane@example.com").await;
    let book = ctx.add_item(dune());
    borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();

    // Act
    let result = borrow_item(&ctx.deps, borrow("U002", &book, day(1))).await;

    // Assert
    assert!(matches!(result, Err(BorrowingError::ItemNotAvailable(_))));
    assert_eq!(ctx.loans.len(), 1);
    assert!(active_loans(&ctx.deps, &UserId::new("U002")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_borrow_blocked_by_unpaid_fine() {
    // Arrange: 15の未払い罰金
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    record(&ctx, "U001", 15).await;

    // Act
    let result = borrow_item(&ctx.deps, borrow("U001", &book, day(0))).await;

    // Assert: 貸出は作成されず、資料も貸出可能のまま
    let err = result.unwrap_err();
    assert!(matches!(err, BorrowingError::UserHasUnpaidFines));
    assert!(err.is_blocking());
    assert!(ctx.loans.is_empty());
    assert!(is_available(&ctx, &book).await);
}

#[tokio::test]
async fn test_borrow_blocked_by_overdue_item() {
    // Arrange: day0にCDを借り、day8時点で延滞
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let cd = ctx.add_item(kind_of_blue());
    let book = ctx.add_item(dune());
    borrow_item(&ctx.deps, borrow("U001", &cd, day(0)))
        .await
        .unwrap();

    // Act
    let result = borrow_item(&ctx.deps, borrow("U001", &book, day(8))).await;

    // Assert
    assert!(matches!(result, Err(BorrowingError::UserHasOverdueItems)));
    assert!(is_available(&ctx, &book).await);
    assert_eq!(ctx.loans.len(), 1);
}

#[tokio::test]
async fn test_borrow_allowed_on_due_date() {
    // 返却期限当日はまだ延滞ではない
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let cd = ctx.add_item(kind_of_blue());
    let book = ctx.add_item(dune());
    borrow_item(&ctx.deps, borrow("U001", &cd, day(0)))
        .await
        .unwrap();

    assert!(borrow_item(&ctx.deps, borrow("U001", &book, day(7))).await.is_ok());
}

#[tokio::test]
async fn test_borrow_unknown_user_or_item() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());

    let result = borrow_item(&ctx.deps, borrow("U404", &book, day(0))).await;
    assert!(matches!(result, Err(BorrowingError::UserNotFound(_))));

    // 同じ識別子でも種別が違えば別の資料
    let missing = LibraryItem::cd("978-0441013593", "Dune (audio)", "Various");
    let result = borrow_item(&ctx.deps, borrow("U001", &missing, day(0))).await;
    assert!(matches!(result, Err(BorrowingError::ItemNotFound(_))));

    assert!(ctx.loans.is_empty());
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_item_success() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let loan = borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();

    let returned = return_item(
        &ctx.deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_on: day(10),
        },
    )
    .await
    .unwrap();

    assert_eq!(returned.returned_on, day(10));
    assert_eq!(returned.due_on, day(28));
    assert!(is_available(&ctx, &book).await);

    let stored = ctx.loans.get_by_id(loan.loan_id).await.unwrap().unwrap();
    assert!(stored.is_returned());
}

#[tokio::test]
async fn test_return_overdue_item_is_accepted() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let loan = borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();

    let result = return_item(
        &ctx.deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_on: day(60),
        },
    )
    .await;

    assert!(result.is_ok());
    assert!(!has_overdue_items(&ctx.deps, &UserId::new("U001"), day(61)).await.unwrap());
}

#[tokio::test]
async fn test_return_twice_is_rejected() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let loan = borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();
    let cmd = ReturnItem {
        loan_id: loan.loan_id,
        returned_on: day(3),
    };
    return_item(&ctx.deps, cmd.clone()).await.unwrap();

    // 別の利用者が借りた後に再返却しても、資料の状態は変わらない
    ctx.add_user("U002", "Jane Roe", "jane@example.com").await;
    borrow_item(&ctx.deps, borrow("U002", &book, day(4)))
        .await
        .unwrap();

    let result = return_item(
        &ctx.deps,
        ReturnItem {
            returned_on: day(5),
            ..cmd
        },
    )
    .await;

    assert!(matches!(result, Err(BorrowingError::AlreadyReturned)));
    assert!(!is_available(&ctx, &book).await);
    let stored = ctx.loans.get_by_id(loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.returned_on(), Some(day(3)));
}

#[tokio::test]
async fn test_return_unknown_loan() {
    let ctx = TestContext::new();

    let result = return_item(
        &ctx.deps,
        ReturnItem {
            loan_id: LoanId::new(),
            returned_on: day(0),
        },
    )
    .await;

    assert!(matches!(result, Err(BorrowingError::LoanNotFound)));
}

// ============================================================================
// 罰金
// ============================================================================

#[tokio::test]
async fn test_pay_exact_total_clears_all_fines() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", 30).await;
    record(&ctx, "U001", 20).await;

    let receipt = pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(50),
        },
    )
    .await
    .unwrap();

    assert_eq!(receipt.applied, Money::new(50));
    assert_eq!(receipt.change, Money::ZERO);
    assert_eq!(receipt.outstanding, Money::ZERO);
    assert!(!has_unpaid_fines(&ctx.deps, &UserId::new("U001")).await.unwrap());

    let all = ctx.fines.find_by_user(&UserId::new("U001")).await.unwrap();
    assert!(all.iter().all(|fine| fine.paid));
}

#[tokio::test]
async fn test_partial_payment_reduces_first_fine_only() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let first = record(&ctx, "U001", 30).await;
    let second = record(&ctx, "U001", 20).await;

    let receipt = pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(10),
        },
    )
    .await
    .unwrap();

    assert_eq!(receipt.outstanding, Money::new(40));

    let unpaid = unpaid_fines(&ctx.deps, &UserId::new("U001")).await.unwrap();
    assert_eq!(unpaid.len(), 2);
    assert_eq!(unpaid[0].fine_id, first.fine_id);
    assert_eq!(unpaid[0].amount, Money::new(20));
    assert_eq!(unpaid[1].fine_id, second.fine_id);
    assert_eq!(unpaid[1].amount, Money::new(20));
}

#[tokio::test]
async fn test_payment_spills_into_next_fine() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", 30).await;
    record(&ctx, "U001", 20).await;

    pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(35),
        },
    )
    .await
    .unwrap();

    let unpaid = unpaid_fines(&ctx.deps, &UserId::new("U001")).await.unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].amount, Money::new(15));
}

#[tokio::test]
async fn test_overpayment_returns_change() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", 15).await;

    let receipt = pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(40),
        },
    )
    .await
    .unwrap();

    assert_eq!(receipt.applied, Money::new(15));
    assert_eq!(receipt.change, Money::new(25));
}

#[tokio::test]
async fn test_pay_fine_rejects_invalid_requests() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;

    let no_fines = pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(10),
        },
    )
    .await;
    assert!(matches!(no_fines, Err(BorrowingError::NoUnpaidFines)));

    record(&ctx, "U001", 10).await;
    for amount in [0, -5] {
        let result = pay_fine(
            &ctx.deps,
            PayFine {
                user_id: UserId::new("U001"),
                amount: Money::new(amount),
            },
        )
        .await;
        assert!(matches!(result, Err(BorrowingError::InvalidPaymentAmount(_))));
    }
    assert!(has_unpaid_fines(&ctx.deps, &UserId::new("U001")).await.unwrap());
}

#[tokio::test]
async fn test_record_fine_validation() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;

    let result = record_fine(
        &ctx.deps,
        RecordFine {
            user_id: UserId::new("U001"),
            amount: Money::ZERO,
        },
    )
    .await;
    assert!(matches!(result, Err(BorrowingError::InvalidFineAmount(_))));

    let result = record_fine(
        &ctx.deps,
        RecordFine {
            user_id: UserId::new("U404"),
            amount: Money::new(10),
        },
    )
    .await;
    assert!(matches!(result, Err(BorrowingError::UserNotFound(_))));
}

#[tokio::test]
async fn test_fine_payment_restores_eligibility() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", 15).await;
    let user_id = UserId::new("U001");

    assert!(!can_borrow(&ctx.deps, &user_id, day(0)).await.unwrap());

    pay_fine(
        &ctx.deps,
        PayFine {
            user_id: user_id.clone(),
            amount: Money::new(15),
        },
    )
    .await
    .unwrap();

    assert!(can_borrow(&ctx.deps, &user_id, day(0)).await.unwrap());
}

// ============================================================================
// 延滞検出・レポート
// ============================================================================

#[tokio::test]
async fn test_overdue_loans_across_users() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    ctx.add_user("U002", "Jane Roe", "jane@example.com").await;
    let book = ctx.add_item(dune());
    let cd = ctx.add_item(kind_of_blue());
    borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();
    borrow_item(&ctx.deps, borrow("U002", &cd, day(0)))
        .await
        .unwrap();

    // day10: CDのみ延滞
    let overdue = overdue_loans(&ctx.deps, day(10)).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].user_id, UserId::new("U002"));

    // day30: 両方延滞
    assert_eq!(overdue_loans(&ctx.deps, day(30)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_mixed_media_report() {
    // Arrange: 書籍・CD・雑誌を day0 に借りる
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let cd = ctx.add_item(kind_of_blue());
    let journal = ctx.add_item(nature());
    for item in [&book, &cd, &journal] {
        borrow_item(&ctx.deps, borrow("U001", item, day(0)))
            .await
            .unwrap();
    }

    // Act: day30（書籍2日、CD23日、雑誌16日延滞）
    let report = mixed_media_report(&ctx.deps, &UserId::new("U001"), day(30))
        .await
        .unwrap();

    // Assert
    assert_eq!(report.report_date, day(30));
    assert_eq!(report.total_items, 3);

    let book_summary = report.by_type[&ItemType::Book];
    assert_eq!(book_summary.count, 1);
    assert_eq!(book_summary.total_fine, Money::new(20));

    let cd_summary = report.by_type[&ItemType::Cd];
    assert_eq!(cd_summary.total_fine, Money::new(460));

    let journal_summary = report.by_type[&ItemType::Journal];
    assert_eq!(journal_summary.total_fine, Money::new(240));

    assert_eq!(report.total_fine, Money::new(720));
}

#[tokio::test]
async fn test_mixed_media_report_without_overdue() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();

    let report = mixed_media_report(&ctx.deps, &UserId::new("U001"), day(28))
        .await
        .unwrap();

    assert_eq!(report.total_items, 0);
    assert_eq!(report.total_fine, Money::ZERO);
    assert!(report.by_type.is_empty());
}

#[tokio::test]
async fn test_loan_history_keeps_returned_loans() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let cd = ctx.add_item(kind_of_blue());
    let first = borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();
    return_item(
        &ctx.deps,
        ReturnItem {
            loan_id: first.loan_id,
            returned_on: day(2),
        },
    )
    .await
    .unwrap();
    borrow_item(&ctx.deps, borrow("U001", &cd, day(3)))
        .await
        .unwrap();

    let user_id = UserId::new("U001");
    let history = loan_history(&ctx.deps, &user_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].is_returned());

    let active = active_loans(&ctx.deps, &user_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].item, cd.item_ref());
}

// ============================================================================
// カタログ
// ============================================================================

#[tokio::test]
async fn test_register_item_rejects_duplicates() {
    let ctx = TestContext::new();

    assert!(register_item(&ctx.deps, dune()).await.unwrap());
    assert!(!register_item(&ctx.deps, dune()).await.unwrap());
    assert!(register_item(&ctx.deps, kind_of_blue()).await.unwrap());

    let items = list_items(&ctx.deps).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_type(), ItemType::Book);
    assert!(items.iter().all(|item| item.available));
}

// ============================================================================
// 同時実行・障害時の整合性
// ============================================================================

type PortResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 呼び出し毎に制御を返し、DBの往復を模す罰金リポジトリ
struct YieldingFines(Arc<memory::FineRepository>);

#[async_trait]
impl ports::FineRepository for YieldingFines {
    async fn save(&self, fine: &Fine) -> PortResult<()> {
        tokio::task::yield_now().await;
        self.0.save(fine).await
    }

    async fn save_all(&self, fines: &[Fine]) -> PortResult<()> {
        tokio::task::yield_now().await;
        self.0.save_all(fines).await
    }

    async fn find_unpaid_for_user(&self, user_id: &UserId) -> PortResult<Vec<Fine>> {
        tokio::task::yield_now().await;
        self.0.find_unpaid_for_user(user_id).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> PortResult<Vec<Fine>> {
        tokio::task::yield_now().await;
        self.0.find_by_user(user_id).await
    }
}

/// 保存だけが失敗する貸出リポジトリ
struct UnwritableLoans(Arc<memory::LoanRepository>);

#[async_trait]
impl ports::LoanRepository for UnwritableLoans {
    async fn save(&self, _loan: &Loan) -> PortResult<()> {
        Err("connection reset".into())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> PortResult<Option<Loan>> {
        self.0.get_by_id(loan_id).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> PortResult<Vec<Loan>> {
        self.0.find_by_user(user_id).await
    }

    async fn find_all(&self) -> PortResult<Vec<Loan>> {
        self.0.find_all().await
    }
}

/// 一括保存が失敗する罰金リポジトリ
struct UnwritableFines(Arc<memory::FineRepository>);

#[async_trait]
impl ports::FineRepository for UnwritableFines {
    async fn save(&self, _fine: &Fine) -> PortResult<()> {
        Err("connection reset".into())
    }

    async fn save_all(&self, _fines: &[Fine]) -> PortResult<()> {
        Err("connection reset".into())
    }

    async fn find_unpaid_for_user(&self, user_id: &UserId) -> PortResult<Vec<Fine>> {
        self.0.find_unpaid_for_user(user_id).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> PortResult<Vec<Fine>> {
        self.0.find_by_user(user_id).await
    }
}

#[tokio::test]
async fn test_concurrent_borrow_lends_item_once() {
    // Arrange
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    ctx.add_user("U002", "Jane Roe", "jane@example.com").await;
    let book = ctx.add_item(dune());
    let deps = ServiceDependencies {
        fine_repository: Arc::new(YieldingFines(ctx.fines.clone())),
        ..ctx.deps.clone()
    };

    // Act
    let (a, b) = tokio::join!(
        borrow_item(&deps, borrow("U001", &book, day(0))),
        borrow_item(&deps, borrow("U002", &book, day(0))),
    );

    // Assert: 片方のみ成功し、貸出は1件
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let rejected = if a.is_ok() { b } else { a };
    assert!(matches!(rejected, Err(BorrowingError::ItemNotAvailable(_))));
    assert_eq!(ctx.loans.find_all().await.unwrap().len(), 1);
    assert!(!is_available(&ctx, &book).await);
}

#[tokio::test]
async fn test_failed_loan_save_releases_item() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let deps = ServiceDependencies {
        loan_repository: Arc::new(UnwritableLoans(ctx.loans.clone())),
        ..ctx.deps.clone()
    };

    let result = borrow_item(&deps, borrow("U001", &book, day(0))).await;

    assert!(matches!(result, Err(BorrowingError::LoanRepositoryError(_))));
    assert!(is_available(&ctx, &book).await);
    assert!(ctx.loans.find_all().await.unwrap().is_empty());

    // 障害が解消すれば貸し出せる
    borrow_item(&ctx.deps, borrow("U001", &book, day(0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_payment_leaves_fines_untouched() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", 10).await;
    record(&ctx, "U001", 15).await;
    let deps = ServiceDependencies {
        fine_repository: Arc::new(UnwritableFines(ctx.fines.clone())),
        ..ctx.deps.clone()
    };

    let result = pay_fine(
        &deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(20),
        },
    )
    .await;

    assert!(matches!(result, Err(BorrowingError::FineRepositoryError(_))));
    let amounts: Vec<Money> = unpaid_fines(&ctx.deps, &UserId::new("U001"))
        .await
        .unwrap()
        .iter()
        .map(|fine| fine.amount)
        .collect();
    assert_eq!(amounts, vec![Money::new(10), Money::new(15)]);
}

#[tokio::test]
async fn test_record_fine_rejects_outstanding_overflow() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record(&ctx, "U001", i64::MAX).await;

    let result = record_fine(
        &ctx.deps,
        RecordFine {
            user_id: UserId::new("U001"),
            amount: Money::new(i64::MAX),
        },
    )
    .await;

    assert!(matches!(result, Err(BorrowingError::InvalidFineAmount(_))));
    assert_eq!(unpaid_fines(&ctx.deps, &UserId::new("U001")).await.unwrap().len(), 1);

    // 上限の残高でも支払いは計算できる
    let receipt = pay_fine(
        &ctx.deps,
        PayFine {
            user_id: UserId::new("U001"),
            amount: Money::new(5),
        },
    )
    .await
    .unwrap();
    assert_eq!(receipt.outstanding, Money::new(i64::MAX - 5));
}
