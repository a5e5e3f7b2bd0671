mod email_notifier;
mod errors;
mod notification_service;

pub use email_notifier::{DEFAULT_SUBJECT, EmailNotifier};
pub use errors::{NotificationError, Result};
pub use notification_service::{NotificationService, build_reminder_message};
