//! Application configuration loaded from the environment

use std::env;

/// SMTP settings for the e-mail channel
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub use_tls: bool,
}

/// Bootstrap admin account
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    /// `None` selects the recording mock e-mail service
    pub smtp: Option<SmtpConfig>,
    pub notification_subject: Option<String>,
    pub admin: Option<AdminConfig>,
}

impl AppConfig {
    /// Read configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = match get("DB_URL") {
            Some(url) => with_credentials(&url, get("DB_USER"), get("DB_PASSWORD")),
            None => get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/library".to_string()),
        };

        let smtp = get("SMTP_HOST").map(|host| SmtpConfig {
            host,
            port: parse_or(get("SMTP_PORT"), 587),
            username: get("SMTP_USERNAME"),
            password: get("SMTP_PASSWORD"),
            from: get("SMTP_FROM").unwrap_or_else(|| "library@localhost".to_string()),
            use_tls: parse_bool_or(get("SMTP_USE_TLS"), true),
        });

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminConfig { username, password }),
            _ => None,
        };

        Self {
            database_url,
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), 5),
            port: parse_or(get("PORT"), 3000),
            smtp,
            notification_subject: get("NOTIFICATION_SUBJECT"),
            admin,
        }
    }
}

/// Insert user and password into a `postgres://host/db` URL that has none
fn with_credentials(url: &str, user: Option<String>, password: Option<String>) -> String {
    let Some(user) = user else {
        return url.to_string();
    };
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    if rest.contains('@') {
        return url.to_string();
    }

    match password {
        Some(password) => format!("{}://{}:{}@{}", scheme, user, password, rest),
        None => format!("{}://{}@{}", scheme, user, rest),
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool_or(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
