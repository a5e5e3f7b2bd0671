use crate::application::ServiceDependencies;
use crate::domain::{Loan, User, UserId};

use super::authentication::{AdminSession, SessionToken};
use super::errors::{Result, UserManagementError};

pub const UNREGISTRATION_SUBJECT: &str = "Account Unregistration Confirmation";

/// 登録解除の確認メール本文
pub fn unregistration_message(user: &User) -> String {
    format!(
        "Dear {},\n\nYour library account has been unregistered. \
         If you have any questions, please contact the library.\n\nThank you.",
        user.name
    )
}

/// 利用者を登録する
///
/// 同じIDが登録済みなら`false`を返し、既存の利用者は変更しない。
pub async fn register_user(deps: &ServiceDependencies, user: User) -> Result<bool> {
    if user.user_id.as_str().trim().is_empty() {
        return Err(UserManagementError::InvalidUserId);
    }

    let inserted = deps
        .user_repository
        .insert(&user)
        .await
        .map_err(UserManagementError::UserRepositoryError)?;

    if inserted {
        tracing::info!(user_id = %user.user_id, "User registered");
    } else {
        tracing::debug!(user_id = %user.user_id, "User already registered");
    }

    Ok(inserted)
}

pub async fn find_user(deps: &ServiceDependencies, user_id: &UserId) -> Result<Option<User>> {
    deps.user_repository
        .find(user_id)
        .await
        .map_err(UserManagementError::UserRepositoryError)
}

pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<User>> {
    deps.user_repository
        .list()
        .await
        .map_err(UserManagementError::UserRepositoryError)
}

/// 利用者の登録を解除する
///
/// ビジネスルール：
/// - 有効な管理者セッションのトークンであること
/// - 未登録のIDは`false`
/// - 貸出中の資料・未払いの罰金があれば拒否
///
/// 解除後に確認メールを送る。送信失敗はログに残すのみで、解除は取り消さない。
pub async fn unregister_user(
    deps: &ServiceDependencies,
    session: &AdminSession,
    token: &SessionToken,
    user_id: &UserId,
) -> Result<bool> {
    // 1. 管理者の確認
    let Some(admin) = session.current_admin(token) else {
        tracing::warn!(user_id = %user_id, "Unregister attempted without admin login");
        return Err(UserManagementError::AdminNotAuthenticated);
    };

    if user_id.as_str().trim().is_empty() {
        return Ok(false);
    }

    // 2. 利用者の存在確認
    let Some(user) = find_user(deps, user_id).await? else {
        return Ok(false);
    };

    // 3. 貸出中の資料の確認
    let loans = deps
        .loan_repository
        .find_by_user(user_id)
        .await
        .map_err(UserManagementError::LoanRepositoryError)?;

    if loans.iter().any(|loan| matches!(loan, Loan::Active(_))) {
        return Err(UserManagementError::UserHasActiveLoans(user_id.clone()));
    }

    // 4. 未払い罰金の確認
    let unpaid = deps
        .fine_repository
        .find_unpaid_for_user(user_id)
        .await
        .map_err(UserManagementError::FineRepositoryError)?;

    if !unpaid.is_empty() {
        return Err(UserManagementError::UserHasUnpaidFines(user_id.clone()));
    }

    // 5. 削除
    let removed = deps
        .user_repository
        .remove(user_id)
        .await
        .map_err(UserManagementError::UserRepositoryError)?;

    if !removed {
        return Ok(false);
    }

    tracing::info!(
        user_id = %user_id,
        admin = %admin,
        "User unregistered"
    );

    // 6. 確認メール（失敗しても解除は維持）
    if user.has_email() {
        if let Err(e) = deps
            .email_service
            .send_email(&user.email, UNREGISTRATION_SUBJECT, &unregistration_message(&user))
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Unregistration email failed");
        }
    }

    Ok(true)
}
