pub mod admin_repository;
pub mod email_service;
pub mod fine_repository;
pub mod item_catalog;
pub mod loan_repository;
pub mod notification_channel;
pub mod user_repository;

pub use admin_repository::AdminRepository;
pub use email_service::EmailService;
pub use fine_repository::FineRepository;
pub use item_catalog::ItemCatalog;
pub use loan_repository::LoanRepository;
pub use notification_channel::NotificationChannel;
pub use user_repository::UserRepository;
