use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use kurs_config::EmailConfig;
use kurs_core::AppError;

pub const RESET_CODE_SUBJECT: &str = "Parolni tiklash kodi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Outbound mail transport. Delivery is attempted once; failures are
/// returned to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::starttls_relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                email
                    .from
                    .parse()
                    .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid from email: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid to email: {}", e)))?)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {}", e)))?;

        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Used when SMTP is disabled: the message is written to the log instead.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP disabled, email not delivered"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, from: String) -> Self {
        Self { mailer, from }
    }

    pub fn from_config(config: EmailConfig) -> Self {
        let from = format!("{} <{}>", config.from_name, config.from_email);
        let mailer: Arc<dyn Mailer> = if config.enabled {
            Arc::new(SmtpMailer::new(config))
        } else {
            Arc::new(LogMailer)
        };
        Self::new(mailer, from)
    }

    #[instrument(skip(self, code))]
    pub async fn send_reset_code(&self, to_email: &str, code: &str) -> Result<(), AppError> {
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: to_email.to_string(),
            subject: RESET_CODE_SUBJECT.to_string(),
            text_body: format!(
                "Parolni tiklash uchun tasdiqlash kodingiz: {}\n\nKod 3 daqiqa amal qiladi.",
                code
            ),
            html_body: reset_code_template(code),
        };

        self.mailer.send(&email).await
    }
}

fn reset_code_template(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="uz">
<head>
    <meta charset="UTF-8">
    <title>Parolni tiklash</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="padding: 30px;">
                <h2 style="margin: 0 0 20px 0; color: #333333;">Parolni tiklash</h2>
                <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px;">
                    Tasdiqlash kodingiz: <strong style="font-size: 22px; letter-spacing: 4px;">{}</strong>
                </p>
                <p style="margin: 0; color: #666666; font-size: 14px;">Kod 3 daqiqa amal qiladi.</p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        code
    )
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingMailer;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Captures sent messages; can be switched to fail every send.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: AtomicBool,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }

        pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
            self.sent().into_iter().rev().find(|e| e.to == to)
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::internal(anyhow::anyhow!("smtp unavailable")));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(email.clone());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_code_email_contents() {
        let mailer = Arc::new(RecordingMailer::new());
        let service = EmailService::new(mailer.clone(), "Kurs <noreply@kurs.uz>".to_string());

        service
            .send_reset_code("ali@example.com", "482913")
            .await
            .unwrap();

        let email = mailer.last_to("ali@example.com").unwrap();
        assert_eq!(email.subject, RESET_CODE_SUBJECT);
        assert_eq!(email.from, "Kurs <noreply@kurs.uz>");
        assert!(email.html_body.contains("<strong"));
        assert!(email.html_body.contains("482913"));
        assert!(email.html_body.contains("Kod 3 daqiqa amal qiladi."));
    }

    #[tokio::test]
    async fn test_failing_mailer_propagates_error() {
        let mailer = Arc::new(RecordingMailer::new());
        mailer.set_failing(true);
        let service = EmailService::new(mailer.clone(), "Kurs <noreply@kurs.uz>".to_string());

        assert!(service.send_reset_code("ali@example.com", "1").await.is_err());
        assert!(mailer.sent().is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_mailer_does_not_log_reset_code() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = EmailService::new(Arc::new(LogMailer), "Kurs <noreply@kurs.uz>".to_string());
        service
            .send_reset_code("ali@example.com", "482913")
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ali@example.com"));
        assert!(output.contains(RESET_CODE_SUBJECT));
        assert!(!output.contains("482913"));
    }
}
