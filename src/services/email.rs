use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    error::{AppError, AppResult},
};

/// Outgoing mail transport
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Delivers mail through an SMTP relay using STARTTLS
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from = self
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::InvalidInput(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalApi(format!("SMTP delivery failed: {}", e)))?;
        Ok(())
    }
}

/// Used when no SMTP relay is configured; the message only goes to the log
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(to, subject, "SMTP not configured, email not sent");
        // Bodies carry live account tokens
        tracing::debug!(to, body, "Unsent email body");
        Ok(())
    }
}

/// Account emails with links back into the frontend
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: &str) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, token)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub async fn send_verification(&self, to: &str, token: &str) {
        let body = format!(
            "Welcome to CoupleMovie!\n\nConfirm your email address by opening this link:\n{}\n\nThe link expires in 24 hours.",
            self.verification_link(token)
        );
        self.deliver(to, "Verify your email", &body).await;
    }

    pub async fn send_password_reset(&self, to: &str, token: &str) {
        let body = format!(
            "We received a request to reset your password.\n\nChoose a new one here:\n{}\n\nThe link expires in 1 hour. If you did not ask for this, ignore this email.",
            self.reset_link(token)
        );
        self.deliver(to, "Reset your password", &body).await;
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) {
        match self.mailer.send(to, subject, body).await {
            Ok(()) => tracing::debug!(to, subject, "Email sent"),
            Err(e) => tracing::error!(error = %e, to, subject, "Failed to send email"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io, sync::Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_links_use_frontend_url() {
        let service = EmailService::new(Arc::new(LogMailer), "http://localhost:5173/");
        assert_eq!(
            service.verification_link("abc"),
            "http://localhost:5173/verify-email?token=abc"
        );
        assert_eq!(
            service.reset_link("xyz"),
            "http://localhost:5173/reset-password?token=xyz"
        );
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_, _, _| Err(AppError::ExternalApi("relay down".to_string())));

        let service = EmailService::new(Arc::new(mailer), "http://localhost:5173");
        service.send_verification("ana@example.com", "tok").await;
    }

    #[tokio::test]
    async fn test_reset_email_contains_link() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, subject, body| {
                to == "ana@example.com"
                    && subject == "Reset your password"
                    && body.contains("/reset-password?token=tok-1")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = EmailService::new(Arc::new(mailer), "http://localhost:5173");
        service.send_password_reset("ana@example.com", "tok-1").await;
    }

    #[tokio::test]
    async fn test_log_mailer_keeps_tokens_out_of_info_logs() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = EmailService::new(Arc::new(LogMailer), "http://localhost:5173");
        service
            .send_password_reset("ana@example.com", "secret-reset-token")
            .await;

        let output = log.contents();
        assert!(output.contains("ana@example.com"));
        assert!(output.contains("Reset your password"));
        assert!(!output.contains("secret-reset-token"));
    }
}
