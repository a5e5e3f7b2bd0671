use crate::config::SmtpConfig;
use crate::ports::email_service::{EmailService, Result};
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::str::FromStr;

/// SMTP implementation of EmailService
///
/// lettre's `SmtpTransport` is blocking, so each send runs on the blocking pool.
#[derive(Clone)]
pub struct SmtpEmailService {
    from: Mailbox,
    mailer: SmtpTransport,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = Mailbox::from_str(&config.from)
            .map_err(|e| format!("Invalid from address {}: {}", config.from, e))?;

        let builder = if config.use_tls {
            SmtpTransport::starttls_relay(&config.host)?
        } else {
            SmtpTransport::builder_dangerous(&config.host)
        }
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            from,
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to_mailbox =
            Mailbox::from_str(to).map_err(|e| format!("Invalid to address {}: {}", to, e))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || mailer.send(&email)).await??;

        tracing::debug!(to, subject, "Email sent");
        Ok(())
    }
}
