use crate::application::{
    borrowing::BorrowingError, notification::NotificationError, users::UserManagementError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Borrowing(BorrowingError),
    UserManagement(UserManagementError),
    Notification(NotificationError),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
}

impl From<BorrowingError> for ApiError {
    fn from(err: BorrowingError) -> Self {
        ApiError::Borrowing(err)
    }
}

impl From<UserManagementError> for ApiError {
    fn from(err: UserManagementError) -> Self {
        ApiError::UserManagement(err)
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        ApiError::Notification(err)
    }
}

type Mapped = (StatusCode, &'static str, String);

/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal(error_type: &'static str, err: &dyn std::error::Error) -> Mapped {
    match err.source() {
        Some(source) => tracing::error!("{}: {}", err, source),
        None => tracing::error!("{}", err),
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_type,
        "An unexpected error occurred".to_string(),
    )
}

fn map_borrowing(err: &BorrowingError) -> Mapped {
    use BorrowingError::*;

    let message = err.to_string();
    match err {
        // 404 Not Found - リクエストされたリソースが存在しない
        UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", message),
        ItemNotFound(_) => (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND", message),
        LoanNotFound => (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND", message),

        // 409 Conflict - 資源の状態と衝突
        ItemNotAvailable(_) => (StatusCode::CONFLICT, "ITEM_NOT_AVAILABLE", message),
        AlreadyReturned => (StatusCode::CONFLICT, "ALREADY_RETURNED", message),

        // 422 Unprocessable Entity - ビジネスルール違反
        UserHasUnpaidFines => (StatusCode::UNPROCESSABLE_ENTITY, "USER_HAS_UNPAID_FINES", message),
        UserHasOverdueItems => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "USER_HAS_OVERDUE_ITEMS",
            message,
        ),
        InvalidPaymentAmount(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_PAYMENT_AMOUNT",
            message,
        ),
        InvalidFineAmount(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_FINE_AMOUNT", message),
        NoUnpaidFines => (StatusCode::UNPROCESSABLE_ENTITY, "NO_UNPAID_FINES", message),

        // 500 Internal Server Error - システム障害
        LoanRepositoryError(_) => internal("LOAN_REPOSITORY_ERROR", err),
        FineRepositoryError(_) => internal("FINE_REPOSITORY_ERROR", err),
        ItemCatalogError(_) => internal("ITEM_CATALOG_ERROR", err),
        UserRepositoryError(_) => internal("USER_REPOSITORY_ERROR", err),
    }
}

fn map_user_management(err: &UserManagementError) -> Mapped {
    use UserManagementError::*;

    let message = err.to_string();
    match err {
        AdminNotAuthenticated => (StatusCode::UNAUTHORIZED, "ADMIN_NOT_AUTHENTICATED", message),
        UserHasActiveLoans(_) => (StatusCode::CONFLICT, "USER_HAS_ACTIVE_LOANS", message),
        UserHasUnpaidFines(_) => (StatusCode::CONFLICT, "USER_HAS_UNPAID_FINES", message),
        InvalidUserId => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_USER_ID", message),
        InvalidCredentials(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CREDENTIALS", message),
        UserRepositoryError(_) => internal("USER_REPOSITORY_ERROR", err),
        AdminRepositoryError(_) => internal("ADMIN_REPOSITORY_ERROR", err),
        LoanRepositoryError(_) => internal("LOAN_REPOSITORY_ERROR", err),
        FineRepositoryError(_) => internal("FINE_REPOSITORY_ERROR", err),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Borrowing(err) => map_borrowing(err),
            ApiError::UserManagement(err) => map_user_management(err),
            ApiError::Notification(NotificationError::OverdueDetection(err)) => map_borrowing(err),
            ApiError::Notification(err) => internal("NOTIFICATION_ERROR", err),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
