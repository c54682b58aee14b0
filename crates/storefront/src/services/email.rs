//! Email service for sending OTP codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use driftwood_core::{Email, OtpCode};

use crate::config::EmailConfig;

/// HTML template for the OTP email.
#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeEmailHtml<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// Plain text template for the OTP email.
#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeEmailText<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// How long the code is advertised as valid in the email copy.
const OTP_TTL_MINUTES: i64 = 5;

/// Errors that can occur when sending email.
#[derive(Debug, thiserror::Error)]
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

    /// Send a one-time sign-in code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_otp_code(&self, to: &Email, code: &OtpCode) -> Result<(), EmailError> {
        let html = OtpCodeEmailHtml {
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;
        let text = OtpCodeEmailText {
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;

        self.send_multipart_email(to.as_str(), "Your Driftwood Home sign-in code", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render_the_code() {
        let code = OtpCode::parse("123456").unwrap();
        let html = OtpCodeEmailHtml {
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()
        .unwrap();
        let text = OtpCodeEmailText {
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()
        .unwrap();

        assert!(html.contains("123456"));
        assert!(text.contains("123456"));
        assert!(text.contains("5 minutes"));
    }
}
