pub mod admin_repository;
pub mod fine_repository;
pub mod loan_repository;
pub mod user_repository;

// パブリックに型を再エクスポート
pub use admin_repository::AdminRepository as PostgresAdminRepository;
pub use fine_repository::FineRepository as PostgresFineRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use user_repository::UserRepository as PostgresUserRepository;
