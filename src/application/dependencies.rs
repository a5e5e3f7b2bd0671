use crate::domain::LibraryPolicy;
use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞いは持たず、各ユースケース関数に明示的に渡す。
/// 貸出期間・料金率の表（`policy`）もここから渡し、モジュール定数には頼らない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_repository: Arc<dyn LoanRepository>,
    pub fine_repository: Arc<dyn FineRepository>,
    pub item_catalog: Arc<dyn ItemCatalog>,
    pub user_repository: Arc<dyn UserRepository>,
    pub admin_repository: Arc<dyn AdminRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub policy: LibraryPolicy,
}
