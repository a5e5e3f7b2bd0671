use library_circulation::application::borrowing::{
    borrow_item, loan_history, record_fine, return_item,
};
use library_circulation::application::users::{
    AdminSession, SessionToken, UNREGISTRATION_SUBJECT, UserManagementError, find_user,
    list_users, provision_admin, register_user, unregister_user,
};
use library_circulation::domain::commands::{BorrowItem, RecordFine, ReturnItem};
use library_circulation::domain::{Money, User, UserId};

mod common;
use common::{TestContext, day, dune};

async fn logged_in_session(ctx: &TestContext) -> (AdminSession, SessionToken) {
    provision_admin(&ctx.deps, "admin", "s3cret").await.unwrap();
    let session = AdminSession::new();
    let token = session
        .login(&ctx.deps, "admin", "s3cret")
        .await
        .unwrap()
        .unwrap();
    (session, token)
}

// ============================================================================
// 登録
// ============================================================================

#[tokio::test]
async fn test_register_user_rejects_duplicate_id() {
    let ctx = TestContext::new();

    let first = User::new("U001", "John Doe", "john@example.com");
    let duplicate = User::new("U001", "Someone Else", "other@example.com");

    assert!(register_user(&ctx.deps, first).await.unwrap());
    assert!(!register_user(&ctx.deps, duplicate).await.unwrap());

    // 既存の利用者は変更されない
    let stored = find_user(&ctx.deps, &UserId::new("U001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "John Doe");
    assert_eq!(list_users(&ctx.deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_rejects_blank_id() {
    let ctx = TestContext::new();

    let result = register_user(&ctx.deps, User::new("  ", "Nobody", "")).await;

    assert!(matches!(result, Err(UserManagementError::InvalidUserId)));
}

// ============================================================================
// 管理者セッション
// ============================================================================

#[tokio::test]
async fn test_admin_login_and_logout() {
    let ctx = TestContext::new();
    provision_admin(&ctx.deps, "admin", "s3cret").await.unwrap();
    let session = AdminSession::new();

    assert!(session.login(&ctx.deps, "admin", "wrong").await.unwrap().is_none());
    assert!(session.login(&ctx.deps, "nobody", "s3cret").await.unwrap().is_none());
    assert_eq!(session.active_sessions(), 0);

    let token = session
        .login(&ctx.deps, "admin", "s3cret")
        .await
        .unwrap()
        .unwrap();
    assert!(session.is_logged_in(&token));
    assert_eq!(session.current_admin(&token).as_deref(), Some("admin"));

    assert!(session.logout(&token));
    assert!(!session.is_logged_in(&token));
    assert!(!session.logout(&token));
}

#[tokio::test]
async fn test_admin_sessions_are_independent() {
    let ctx = TestContext::new();
    provision_admin(&ctx.deps, "admin", "s3cret").await.unwrap();
    let session = AdminSession::new();

    let first = session.login(&ctx.deps, "admin", "s3cret").await.unwrap().unwrap();
    let second = session.login(&ctx.deps, "admin", "s3cret").await.unwrap().unwrap();
    assert_ne!(first, second);

    // 片方のログアウトはもう片方に影響しない
    session.logout(&first);
    assert!(!session.is_logged_in(&first));
    assert!(session.is_logged_in(&second));
}

#[tokio::test]
async fn test_provision_admin_rejects_empty_password() {
    let ctx = TestContext::new();

    let result = provision_admin(&ctx.deps, "admin", "").await;

    assert!(matches!(
        result,
        Err(UserManagementError::InvalidCredentials(_))
    ));
}

// ============================================================================
// 登録解除
// ============================================================================

#[tokio::test]
async fn test_unregister_requires_admin() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let (session, _token) = logged_in_session(&ctx).await;

    // 発行されていないトークンでは解除できない
    let forged = SessionToken::new("not-a-session");
    let result = unregister_user(&ctx.deps, &session, &forged, &UserId::new("U001")).await;

    assert!(matches!(
        result,
        Err(UserManagementError::AdminNotAuthenticated)
    ));
    assert!(find_user(&ctx.deps, &UserId::new("U001")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unregister_rejects_logged_out_token() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let (session, token) = logged_in_session(&ctx).await;
    session.logout(&token);

    let result = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001")).await;

    assert!(matches!(
        result,
        Err(UserManagementError::AdminNotAuthenticated)
    ));
}

#[tokio::test]
async fn test_unregister_unknown_user_returns_false() {
    let ctx = TestContext::new();
    let (session, token) = logged_in_session(&ctx).await;

    let removed = unregister_user(&ctx.deps, &session, &token, &UserId::new("U404"))
        .await
        .unwrap();

    assert!(!removed);
    assert_eq!(ctx.email.sent_count(), 0);
}

#[tokio::test]
async fn test_unregister_sends_confirmation_email() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let (session, token) = logged_in_session(&ctx).await;

    let removed = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001"))
        .await
        .unwrap();

    assert!(removed);
    assert!(find_user(&ctx.deps, &UserId::new("U001")).await.unwrap().is_none());

    let sent = ctx.email.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "john@example.com");
    assert_eq!(sent[0].subject, UNREGISTRATION_SUBJECT);
    assert!(sent[0].body.starts_with("Dear John Doe,"));
}

#[tokio::test]
async fn test_unregister_blocked_by_active_loan() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    borrow_item(
        &ctx.deps,
        BorrowItem {
            user_id: UserId::new("U001"),
            item: book.item_ref(),
            borrowed_on: day(0),
        },
    )
    .await
    .unwrap();
    let (session, token) = logged_in_session(&ctx).await;

    let result = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001")).await;

    assert!(matches!(
        result,
        Err(UserManagementError::UserHasActiveLoans(_))
    ));
    assert!(find_user(&ctx.deps, &UserId::new("U001")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unregister_blocked_by_unpaid_fine() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    record_fine(
        &ctx.deps,
        RecordFine {
            user_id: UserId::new("U001"),
            amount: Money::new(10),
        },
    )
    .await
    .unwrap();
    let (session, token) = logged_in_session(&ctx).await;

    let result = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001")).await;

    assert!(matches!(
        result,
        Err(UserManagementError::UserHasUnpaidFines(_))
    ));
    assert_eq!(ctx.email.sent_count(), 0);
}

#[tokio::test]
async fn test_unregister_survives_email_failure() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let (session, token) = logged_in_session(&ctx).await;
    ctx.email.set_failing(true);

    let removed = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001"))
        .await
        .unwrap();

    // メール送信に失敗しても解除は取り消されない
    assert!(removed);
    assert!(find_user(&ctx.deps, &UserId::new("U001")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unregister_keeps_loan_history() {
    let ctx = TestContext::new();
    ctx.add_user("U001", "John Doe", "john@example.com").await;
    let book = ctx.add_item(dune());
    let loan = borrow_item(
        &ctx.deps,
        BorrowItem {
            user_id: UserId::new("U001"),
            item: book.item_ref(),
            borrowed_on: day(0),
        },
    )
    .await
    .unwrap();
    return_item(
        &ctx.deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_on: day(3),
        },
    )
    .await
    .unwrap();
    let (session, token) = logged_in_session(&ctx).await;

    let removed = unregister_user(&ctx.deps, &session, &token, &UserId::new("U001"))
        .await
        .unwrap();

    assert!(removed);
    let history = loan_history(&ctx.deps, &UserId::new("U001")).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].returned_on(), Some(day(3)));
}
