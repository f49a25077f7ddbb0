//! Email service for password resets and admin replies.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Outbound
//! mail is fire-and-forget: callers use [`EmailService::send_spawned`] and
//! failures are logged, never surfaced to the request that triggered them.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    reset_link: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    reset_link: &'a str,
}

/// HTML template for an administrator reply to a contact message.
#[derive(Template)]
#[template(path = "email/admin_reply.html")]
struct AdminReplyHtml<'a> {
    name: &'a str,
    reply: &'a str,
}

/// Plain text template for an administrator reply.
#[derive(Template)]
#[template(path = "email/admin_reply.txt")]
struct AdminReplyText<'a> {
    name: &'a str,
    reply: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a password reset email containing the signed reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to
    /// render.
    pub async fn send_password_reset(
        &self,
        to: &str,
        reset_link: &str,
    ) -> Result<(), EmailError> {
        let html = PasswordResetHtml { reset_link }.render()?;
        let text = PasswordResetText { reset_link }.render()?;

        self.send_multipart_email(to, "Reset your Atelier password", &text, &html)
            .await
    }

    /// Send an administrator's reply to a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to
    /// render.
    pub async fn send_admin_reply(
        &self,
        to: &str,
        name: &str,
        subject: &str,
        reply: &str,
    ) -> Result<(), EmailError> {
        let html = AdminReplyHtml { name, reply }.render()?;
        let text = AdminReplyText { name, reply }.render()?;

        self.send_multipart_email(to, subject, &text, &html).await
    }

    /// Fire-and-forget send: spawn the future and log the outcome.
    ///
    /// The error channel is the log; request handlers never wait on SMTP.
    pub fn send_spawned<F>(future: F, what: &'static str)
    where
        F: std::future::Future<Output = Result<(), EmailError>> + Send + 'static,
    {
        tokio::spawn(async move {
            match future.await {
                Ok(()) => tracing::info!(kind = what, "email sent"),
                Err(e) => tracing::error!(kind = what, error = %e, "email failed"),
            }
        });
    }

    /// Build and send a multipart (text + HTML) message.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_owned()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_owned()),
                    ),
            )?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_templates_render_link() {
        let link = "https://example.com/reset?token=abc";
        let html = PasswordResetHtml { reset_link: link }.render().unwrap();
        let text = PasswordResetText { reset_link: link }.render().unwrap();
        assert!(html.contains(link));
        assert!(text.contains(link));
    }

    #[test]
    fn test_admin_reply_templates_render_body() {
        let html = AdminReplyHtml {
            name: "Ada",
            reply: "Thanks for reaching out.",
        }
        .render()
        .unwrap();
        assert!(html.contains("Ada"));
        assert!(html.contains("Thanks for reaching out."));
    }
}
