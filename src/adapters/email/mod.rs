pub mod smtp;

pub use smtp::SmtpEmailService;
