use crate::application::{
    ServiceDependencies,
    borrowing::{self, MixedMediaReport, PaymentReceipt},
    notification::NotificationService,
    users::{self, AdminSession, SessionToken, UserManagementError},
};
use crate::domain::{
    Fine, ItemId, ItemRef, ItemType, LibraryItem, Loan, LoanId, Money, UnknownItemType, UserId,
    commands::*,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        AdminLoginRequest, AdminLoginResponse, AmountRequest, AsOfQuery, BorrowItemRequest,
        EligibilityResponse, FineQuoteQuery, FineQuoteResponse, LoanResponse, OverdueLoanResponse, RegisterItemRequest,
        RegisterUserRequest, RemindersSentResponse, UserResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub notifications: Arc<NotificationService>,
    pub admin_session: Arc<AdminSession>,
}

/// `Authorization: Bearer <token>`ヘッダーから管理者トークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| SessionToken::new(token))
}

// ============================================================================
// Users / admin
// ============================================================================

/// POST /users - 利用者を登録
///
/// 同じIDが登録済みの場合は409。
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = req.to_user();

    if !users::register_user(&state.service_deps, user.clone()).await? {
        return Err(ApiError::Conflict(format!(
            "User {} is already registered",
            user.user_id
        )));
    }

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/:id - 利用者を取得
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = UserId::new(user_id);

    users::find_user(&state.service_deps, &user_id)
        .await?
        .map(|user| Json(UserResponse::from(user)))
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
}

/// DELETE /users/:id - 利用者の登録を解除（管理者のみ）
///
/// 強制されるビジネスルール:
/// - 有効な管理者トークンが`Authorization`ヘッダーにあること
/// - 貸出中の資料・未払いの罰金がないこと
pub async fn unregister_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user_id = UserId::new(user_id);
    let token = bearer_token(&headers).ok_or(UserManagementError::AdminNotAuthenticated)?;

    let removed =
        users::unregister_user(&state.service_deps, &state.admin_session, &token, &user_id)
            .await?;

    if !removed {
        return Err(ApiError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/login - 管理者ログイン
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let token = state
        .admin_session
        .login(&state.service_deps, &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(Json(AdminLoginResponse {
        username: req.username,
        token: token.as_str().to_string(),
    }))
}

/// POST /admin/logout - 管理者ログアウト
///
/// リクエストのトークンのみを失効させる。
pub async fn admin_logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers).ok_or(UserManagementError::AdminNotAuthenticated)?;

    if !state.admin_session.logout(&token) {
        return Err(UserManagementError::AdminNotAuthenticated.into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Items
// ============================================================================

/// POST /items - 資料をカタログに登録
pub async fn register_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterItemRequest>,
) -> Result<(StatusCode, Json<LibraryItem>), ApiError> {
    let item = req.into_item();

    if !borrowing::register_item(&state.service_deps, item.clone()).await? {
        return Err(ApiError::Conflict(format!(
            "Item {} is already registered",
            item.item_ref()
        )));
    }

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /items - カタログの全資料
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LibraryItem>>, ApiError> {
    Ok(Json(borrowing::list_items(&state.service_deps).await?))
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans - 資料を貸し出す
///
/// 強制されるビジネスルール:
/// - 利用者・資料が存在すること
/// - 資料が貸出可能であること
/// - 利用者に未払いの罰金・延滞中の貸出がないこと
pub async fn borrow_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowItemRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let item_type: ItemType = req
        .item_type
        .parse()
        .map_err(|e: UnknownItemType| ApiError::BadRequest(e.to_string()))?;

    let cmd = BorrowItem {
        user_id: UserId::new(req.user_id),
        item: ItemRef::new(item_type, ItemId::new(req.item_id)),
        borrowed_on: req
            .borrowed_on
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
    };

    let loan = borrowing::borrow_item(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(Loan::from(loan)))))
}

/// POST /loans/:id/return - 資料を返却
///
/// `as_of`が返却日になる。延滞中の貸出も返却できる。
pub async fn return_item(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnItem {
        loan_id: LoanId::from_uuid(loan_id),
        returned_on: query.date(),
    };

    let returned = borrowing::return_item(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(Loan::from(returned))))
}

/// GET /loans/overdue - 延滞中の全貸出と延滞料金
pub async fn list_overdue_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Vec<OverdueLoanResponse>>, ApiError> {
    let as_of = query.date();
    let policy = state.service_deps.policy;

    let overdue = borrowing::overdue_loans(&state.service_deps, as_of).await?;

    let response = overdue
        .into_iter()
        .map(|loan| {
            let days_overdue = loan.days_overdue(as_of);
            let loan = Loan::from(loan);
            OverdueLoanResponse {
                fine: borrowing::fine_for(&policy, &loan, as_of),
                days_overdue,
                loan: LoanResponse::from(loan),
            }
        })
        .collect();

    Ok(Json(response))
}

/// GET /users/:id/loans - 利用者の貸出履歴
pub async fn list_user_loans(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = borrowing::loan_history(&state.service_deps, &UserId::new(user_id)).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /users/:id/eligibility - 貸出資格
pub async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let user_id = UserId::new(user_id);
    let as_of = query.date();
    let deps = &state.service_deps;

    let has_unpaid_fines = borrowing::has_unpaid_fines(deps, &user_id).await?;
    let has_overdue_items = borrowing::has_overdue_items(deps, &user_id, as_of).await?;

    Ok(Json(EligibilityResponse {
        user_id: user_id.as_str().to_string(),
        as_of,
        can_borrow: !has_unpaid_fines && !has_overdue_items,
        has_unpaid_fines,
        has_overdue_items,
    }))
}

// ============================================================================
// Fines
// ============================================================================

/// POST /users/:id/fines - 罰金を記録
pub async fn record_fine(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<(StatusCode, Json<Fine>), ApiError> {
    let cmd = RecordFine {
        user_id: UserId::new(user_id),
        amount: Money::new(req.amount),
    };

    let fine = borrowing::record_fine(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(fine)))
}

/// GET /fine-rates/:item_type - 種別タグから延滞料金を試算
///
/// 未知のタグは400。
pub async fn quote_fine(
    State(state): State<Arc<AppState>>,
    Path(item_type): Path<String>,
    Query(query): Query<FineQuoteQuery>,
) -> Result<Json<FineQuoteResponse>, ApiError> {
    let rate = state
        .service_deps
        .policy
        .fine_rate_for_tag(&item_type)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(FineQuoteResponse {
        item_type: item_type.trim().to_ascii_uppercase(),
        daily_rate: rate.daily_rate(),
        overdue_days: query.days,
        fine: rate.calculate_fine(query.days),
    }))
}

/// POST /users/:id/fines/payments - 罰金を支払う
///
/// 未払い罰金へ作成順に充当する。
pub async fn pay_fine(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<PaymentReceipt>, ApiError> {
    let cmd = PayFine {
        user_id: UserId::new(user_id),
        amount: Money::new(req.amount),
    };

    Ok(Json(borrowing::pay_fine(&state.service_deps, cmd).await?))
}

// ============================================================================
// Reports / notifications
// ============================================================================

/// GET /users/:id/overdue-report - 種別ごとの延滞レポート
pub async fn get_overdue_report(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<MixedMediaReport>, ApiError> {
    let report =
        borrowing::mixed_media_report(&state.service_deps, &UserId::new(user_id), query.date())
            .await?;

    Ok(Json(report))
}

/// POST /reminders - 延滞中の全利用者へ督促を送る
pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<RemindersSentResponse>, ApiError> {
    let as_of = query.date();
    let notified_users = state.notifications.send_overdue_reminders(as_of).await?;

    Ok(Json(RemindersSentResponse {
        as_of,
        notified_users,
    }))
}
