//! Mailer - Invio delle email transazionali (reset password, benvenuto staff)
//!
//! Con `SMTP_HOST` configurato le email partono via SMTP (lettre), altrimenti vengono
//! solo loggate: utile in sviluppo e nei test.

use crate::core::config::SmtpConfig;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from_address: String,
    },
    Log,
}

impl Mailer {
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailerError> {
        let Some(config) = smtp else {
            return Ok(Mailer::Log);
        };
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        Ok(Mailer::Smtp {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    #[instrument(skip(self, body), fields(to = %to, subject = %subject))]
    pub async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailerError> {
        match self {
            Mailer::Log => {
                // il body può contenere link di reset, non va loggato
                info!("SMTP not configured, email not sent ({} bytes)", body.len());
                Ok(())
            }
            Mailer::Smtp {
                transport,
                from_address,
            } => {
                let email = Message::builder()
                    .from(
                        from_address
                            .parse::<Mailbox>()
                            .map_err(|_| MailerError::InvalidAddress(from_address.clone()))?,
                    )
                    .to(to
                        .parse::<Mailbox>()
                        .map_err(|_| MailerError::InvalidAddress(to.to_string()))?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)?;

                transport.send(email).await?;
                info!("Email sent successfully");
                Ok(())
            }
        }
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_link: &str,
        ttl_minutes: i64,
    ) -> Result<(), MailerError> {
        let body = format!(
            "Hello {name},\n\nwe received a request to reset your PetConnect password.\n\
             Open the link below within {ttl_minutes} minutes to choose a new one:\n\n{reset_link}\n\n\
             If you did not ask for this, you can ignore this email."
        );
        self.send(to, "PetConnect password reset", body).await
    }

    pub async fn send_staff_welcome(
        &self,
        to: &str,
        name: &str,
        username: &str,
        clinic_name: &str,
    ) -> Result<(), MailerError> {
        let body = format!(
            "Hello {name},\n\nan account has been created for you at {clinic_name} on PetConnect.\n\
             Your username is: {username}\n\nAsk your administrator for the initial password."
        );
        self.send(to, "Your PetConnect staff account", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_smtp_uses_log_mailer() {
        let mailer = Mailer::from_config(None).unwrap();
        assert!(matches!(mailer, Mailer::Log));
    }

    #[tokio::test]
    async fn test_unreachable_smtp_reports_error() {
        let mailer = Mailer::Smtp {
            transport: AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
                .port(1)
                .build(),
            from_address: "PetConnect <no-reply@petconnect.local>".to_string(),
        };
        let result = mailer
            .send_password_reset("owner@example.com", "Anna", "http://localhost/reset?token=x", 30)
            .await;
        assert!(matches!(result, Err(MailerError::Smtp(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = Mailer::Log;
        mailer
            .send_password_reset("owner@example.com", "Anna", "http://localhost/reset?token=x", 30)
            .await
            .unwrap();
    }
}
