//! Outbound mail: a bounded in-process queue drained by a worker task.
//!
//! Handlers enqueue and move on; SMTP latency and retries never sit inside a
//! request. A full queue applies backpressure instead of dropping mail.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;

use crate::config::AuthConfig;
use crate::domain::repository::MailerPort;
use crate::domain::types::OutboundEmail;
use crate::error::AuthServiceError;

#[allow(async_fn_in_trait)]
pub trait MailTransport {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}

// ── SMTP transport ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        let from = config.smtp_from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse::<Mailbox>()?)
            .subject(&email.subject)
            .body(email.body.clone())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

// ── Queue handle ─────────────────────────────────────────────────────────────

/// Sending half of the mail queue, held by `AppState`.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::Sender<OutboundEmail>,
}

impl MailQueue {
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<OutboundEmail>) {
        let (tx, rx) = mpsc::channel(depth);
        (Self { tx }, rx)
    }
}

impl MailerPort for MailQueue {
    async fn enqueue(&self, email: OutboundEmail) -> Result<(), AuthServiceError> {
        self.tx
            .send(email)
            .await
            .map_err(|_| AuthServiceError::Internal(anyhow::anyhow!("mail queue closed")))
    }
}

// ── Worker ───────────────────────────────────────────────────────────────────

/// Drain the queue until every sender is dropped. Each message gets up to
/// `max_retries` delivery attempts; a message that exhausts them is logged
/// and dropped, never requeued.
pub async fn run_mail_worker<T: MailTransport>(
    transport: T,
    mut rx: mpsc::Receiver<OutboundEmail>,
    max_retries: u32,
) {
    while let Some(email) = rx.recv().await {
        let mut delivered = false;
        for attempt in 1..=max_retries {
            match transport.send(&email).await {
                Ok(()) => {
                    delivered = true;
                    break;
                }
                Err(e) if attempt < max_retries => {
                    tracing::warn!(error = %e, attempt, to = %email.to, "mail delivery failed, retrying");
                }
                Err(e) => {
                    tracing::error!(error = %e, to = %email.to, subject = %email.subject, "mail delivery failed permanently");
                }
            }
        }
        if delivered {
            tracing::debug!(to = %email.to, subject = %email.subject, "mail delivered");
        }
    }
}
