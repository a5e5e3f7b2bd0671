pub mod borrowing;
mod dependencies;
pub mod notification;
pub mod users;

pub use dependencies::ServiceDependencies;
