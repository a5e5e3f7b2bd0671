pub mod admin_repository;
pub mod fine_repository;
pub mod item_catalog;
pub mod loan_repository;
pub mod user_repository;

pub use admin_repository::AdminRepository;
pub use fine_repository::FineRepository;
pub use item_catalog::ItemCatalog;
pub use loan_repository::LoanRepository;
pub use user_repository::UserRepository;
