// Best-effort notification boundary. Delivery failures are logged and never
// propagate to the operation that triggered them.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use crate::config::SmtpConfig;

pub mod templates;

#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), NotifyError>;
}

pub type DynNotifier = Arc<dyn Notifier>;

/// SMTP-backed notifier using lettre's async transport.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| NotifyError::Address(config.from.clone()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, mail: &Mail) -> Result<(), NotifyError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| NotifyError::Address(mail.to.clone()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .multipart(MultiPart::alternative_plain_html(
                mail.text_body.clone(),
                mail.html_body.clone(),
            ))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        Ok(())
    }
}

/// Fallback used when SMTP is not configured: logs the mail instead of
/// delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, mail: &Mail) -> Result<(), NotifyError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Email delivery skipped (SMTP not configured)");
        Ok(())
    }
}

/// Fire-and-forget delivery. The spawned task owns the mail; a failure is
/// logged and never reaches the caller.
pub fn spawn_notify(notifier: DynNotifier, mail: Mail) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&mail).await {
            tracing::warn!(to = %mail.to, subject = %mail.subject, "Notification delivery failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<Mail>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, mail: &Mail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let mail = Mail {
            to: "someone@example.com".into(),
            subject: "Hello".into(),
            text_body: "hi".into(),
            html_body: "<p>hi</p>".into(),
        };
        assert!(LogNotifier.send(&mail).await.is_ok());
    }

    #[tokio::test]
    async fn spawn_notify_delivers_in_background() {
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
        });
        let mail = Mail {
            to: "shelter@example.com".into(),
            subject: "New application".into(),
            text_body: "body".into(),
            html_body: "<p>body</p>".into(),
        };
        spawn_notify(notifier.clone(), mail);

        // Yield until the spawned task has run
        for _ in 0..50 {
            if !notifier.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "shelter@example.com");
    }
}
