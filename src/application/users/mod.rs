mod authentication;
mod errors;
mod user_management;

pub use authentication::{AdminSession, SessionToken, provision_admin};
pub use errors::{Result, UserManagementError};
pub use user_management::{
    UNREGISTRATION_SUBJECT, find_user, list_users, register_user, unregister_user,
    unregistration_message,
};
