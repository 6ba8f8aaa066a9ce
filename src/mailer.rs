use anyhow::Context;
use axum::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound mail seam. The reset flow only ever needs one kind of message,
/// so the trait stays narrow; tests substitute their own implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_link(&self, to: &str, link: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn from_config(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
            .context("build smtp transport")?
            .credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ))
            .port(cfg.port)
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();
        Ok(Self {
            transport,
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_link(&self, to: &str, link: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(to.parse().context("invalid recipient address")?)
            .subject("Reset Password Request")
            .header(ContentType::TEXT_PLAIN)
            .body(reset_mail_body(link))
            .context("build reset email")?;

        self.transport
            .send(email)
            .await
            .context("smtp send failed")?;
        info!(%to, "reset email sent");
        Ok(())
    }
}

fn reset_mail_body(link: &str) -> String {
    format!(
        "Hello,\n\n\
        We received a request to reset the password for your Workplace \
        Registry account.\n\n\
        Open the following link to choose a new password:\n\n\
        {}\n\n\
        This link will expire in 1 hour.\n\n\
        If you did not request a password reset, please ignore this email.\n\n\
        Workplace Registry",
        link
    )
}
