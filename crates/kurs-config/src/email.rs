use std::env;

#[derive(Clone, Debug)]
pub struct EmailConfig {
    /// When false, outgoing mail is written to the log instead of SMTP.
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let smtp_username = env::var("SMTP_USERNAME")
            .or_else(|_| env::var("EMAIL_USER"))
            .unwrap_or_default();

        Self {
            enabled: env::var("SMTP_ENABLED")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            smtp_password: env::var("SMTP_PASSWORD")
                .or_else(|_| env::var("EMAIL_PASS"))
                .unwrap_or_default(),
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Kurs".to_string()),
            smtp_username,
        }
    }
}
