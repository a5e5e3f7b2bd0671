use crate::ports::email_service::{EmailService as EmailServiceTrait, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// An email captured by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mock implementation of EmailService
///
/// Records every email instead of sending it.
/// Can be switched into a failing mode to simulate an unreachable mail server.
#[derive(Default)]
pub struct EmailService {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl EmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that rejects every send
    pub fn failing() -> Self {
        let service = Self::new();
        service.set_failing(true);
        service
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Emails recorded so far, in send order
    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl EmailServiceTrait for EmailService {
    /// Record the email, or fail without recording when in failing mode
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(format!("mock email service refused message to {}", to).into());
        }

        tracing::debug!(to, subject, "Mock email recorded");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
