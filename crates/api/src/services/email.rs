//! Email dispatcher for game reminders.
//!
//! Supports two providers:
//! - `console`: Logs emails (development)
//! - `smtp`: Sends through an SMTP relay with STARTTLS and PLAIN auth

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use domain::models::RsvpStatus;
use domain::services::{Channel, ChannelError, ReminderChannel, ReminderLinks, ReminderMessage};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("Email service disabled")]
    Disabled,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

impl From<EmailError> for ChannelError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Disabled => ChannelError::Disabled,
            EmailError::InvalidAddress(msg) | EmailError::Build(msg) => ChannelError::Render(msg),
            EmailError::NotConfigured(msg) | EmailError::SendFailed(msg) => {
                ChannelError::Transport(msg)
            }
        }
    }
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

enum Provider {
    Console,
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
}

/// Sends reminder emails. Cheap to clone.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    provider: Arc<Provider>,
    links: Arc<dyn ReminderLinks>,
    display_offset: FixedOffset,
}

impl EmailService {
    /// Builds the service. The SMTP transport is created once here and reused
    /// for every message.
    pub fn new(
        config: EmailConfig,
        links: Arc<dyn ReminderLinks>,
        display_offset: FixedOffset,
    ) -> Result<Self, EmailError> {
        let provider = match config.provider.as_str() {
            "console" => Provider::Console,
            "smtp" => Provider::Smtp(build_transport(&config)?),
            other => {
                error!(provider = %other, "Unknown email provider");
                return Err(EmailError::NotConfigured(format!(
                    "unknown provider {other}"
                )));
            }
        };

        Ok(Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
            links,
            display_offset,
        })
    }

    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(subject = %message.subject, "Email service disabled, skipping send");
            return Err(EmailError::Disabled);
        }

        match self.provider.as_ref() {
            Provider::Console => {
                self.send_console(&message);
                Ok(())
            }
            Provider::Smtp(transport) => self.send_smtp(transport, message).await,
        }
    }

    /// Renders the reminder for one player and game. The token is embedded in
    /// each of the three status links.
    pub fn render_reminder(
        &self,
        reminder: &ReminderMessage,
        token: &str,
    ) -> Result<EmailMessage, EmailError> {
        let game = &reminder.game;
        let when = game.display_time(self.display_offset);
        let url = |status| self.links.rsvp_url(game, token, status);
        let (yes, no, maybe) = (
            url(RsvpStatus::Yes),
            url(RsvpStatus::No),
            url(RsvpStatus::Maybe),
        );

        let body_text = format!(
            r#"Dear {name},

This is your game reminder. The next game is:

    {when} {description}

Can you make the game?

Yes: {yes}
No: {no}
Maybe: {maybe}

Thank you for using {sender}!"#,
            name = reminder.player.name,
            description = game.description,
            sender = self.config.sender_name,
        );

        let body_html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Game reminder</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333;">
    <p>Dear {name},<br>
    This is your game reminder. The next game is:</p>
    <blockquote>{when} {description}</blockquote>
    <p>Can you make the game?</p>
    <ul>
        <li><a href="{yes}">Yes</a></li>
        <li><a href="{no}">No</a></li>
        <li><a href="{maybe}">Maybe</a></li>
    </ul>
    <p>Thank you for using {sender}!</p>
</body>
</html>"#,
            name = escape_html(&reminder.player.name),
            description = escape_html(&game.description),
            sender = escape_html(&self.config.sender_name),
            yes = escape_html(&yes),
            no = escape_html(&no),
            maybe = escape_html(&maybe),
        );

        Ok(EmailMessage {
            to: reminder.player.email.clone(),
            to_name: Some(reminder.player.name.clone()),
            subject: format!("Next Game: {} {}", when, game.description),
            body_text,
            body_html,
        })
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        debug!(body_text = %message.body_text, "Email body (plain text)");
    }

    async fn send_smtp(
        &self,
        transport: &AsyncSmtpTransport<Tokio1Executor>,
        message: EmailMessage,
    ) -> Result<(), EmailError> {
        let email = self.build_message(message)?;
        let response = transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }

    fn build_message(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let from = mailbox(
            Some(self.config.sender_name.clone()),
            &self.config.sender_email,
        )?;
        let to = mailbox(message.to_name, &message.to)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.body_text,
                message.body_html,
            ))
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    if config.smtp_host.is_empty() {
        return Err(EmailError::NotConfigured("smtp_host is empty".into()));
    }

    let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        .map_err(|e| EmailError::NotConfigured(e.to_string()))?;

    Ok(builder
        .port(config.smtp_port)
        .credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ))
        .authentication(vec![Mechanism::Plain])
        .timeout(Some(Duration::from_secs(config.timeout_secs)))
        .build())
}

fn mailbox(name: Option<String>, email: &str) -> Result<Mailbox, EmailError> {
    let address: lettre::Address = email
        .parse()
        .map_err(|_| EmailError::InvalidAddress(email.to_string()))?;
    Ok(Mailbox::new(name, address))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl ReminderChannel for EmailService {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn send_reminder(&self, reminder: &ReminderMessage) -> Result<(), ChannelError> {
        let token = reminder
            .token
            .as_deref()
            .ok_or_else(|| ChannelError::Render("missing reminder token".into()))?;

        let message = self.render_reminder(reminder, token)?;
        self.send(message).await?;

        info!(
            player_id = reminder.player.id,
            game_id = reminder.game.id,
            team_id = reminder.team.id,
            "Reminder email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::links::RouteLinks;
    use chrono::{Offset, TimeZone, Utc};
    use domain::models::{Game, Player, Team};

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            sender_email: "team@example.com".to_string(),
            sender_name: "Rsvp".to_string(),
            ..Default::default()
        }
    }

    fn service(config: EmailConfig) -> EmailService {
        EmailService::new(
            config,
            Arc::new(RouteLinks::new("https://rsvp.example.com")),
            Utc.fix(),
        )
        .unwrap()
    }

    fn reminder(token: Option<&str>) -> ReminderMessage {
        ReminderMessage {
            player: Player {
                id: 7,
                name: "Sam <Goalie>".to_string(),
                email: "sam@example.com".to_string(),
                phone: None,
            },
            game: Game {
                id: 42,
                team_id: 3,
                season_id: None,
                starts_at: Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 0).unwrap(),
                description: "Owls vs Hawks".to_string(),
            },
            team: Team {
                id: 3,
                name: "Owls".to_string(),
                division_id: Some(1),
            },
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_render_reminder() {
        let service = service(test_config());
        let message = service.render_reminder(&reminder(None), "tok123").unwrap();

        assert_eq!(message.subject, "Next Game: Tue Jan 2 3:04PM Owls vs Hawks");
        assert_eq!(message.to, "sam@example.com");
        for code in ["Y", "N", "M"] {
            let link = format!("https://rsvp.example.com/game/42/show?token=tok123&status={code}");
            assert!(message.body_text.contains(&link), "missing {code} link");

            let href = format!(
                r#"href="https://rsvp.example.com/game/42/show?token=tok123&amp;status={code}""#
            );
            assert!(message.body_html.contains(&href), "missing {code} href");
        }
        assert!(!message.body_html.contains("tok123&status="));
        assert!(message.body_html.contains("Sam &lt;Goalie&gt;"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = EmailConfig {
            provider: "carrier-pigeon".to_string(),
            ..test_config()
        };
        let result = EmailService::new(
            config,
            Arc::new(RouteLinks::new("https://rsvp.example.com")),
            Utc.fix(),
        );
        assert!(matches!(result, Err(EmailError::NotConfigured(_))));
    }

    #[test]
    fn test_smtp_requires_host() {
        let config = EmailConfig {
            provider: "smtp".to_string(),
            ..test_config()
        };
        let result = EmailService::new(
            config,
            Arc::new(RouteLinks::new("https://rsvp.example.com")),
            Utc.fix(),
        );
        assert!(matches!(result, Err(EmailError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_console_send_reminder() {
        let service = service(test_config());
        assert!(service.is_enabled());
        assert!(service.send_reminder(&reminder(Some("tok"))).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_reminder_requires_token() {
        let service = service(test_config());
        let err = service.send_reminder(&reminder(None)).await.unwrap_err();
        assert!(matches!(err, ChannelError::Render(_)));
    }

    #[tokio::test]
    async fn test_disabled_service_reports_disabled() {
        let service = service(EmailConfig {
            enabled: false,
            ..test_config()
        });
        let err = service.send_reminder(&reminder(Some("tok"))).await.unwrap_err();
        assert_eq!(err, ChannelError::Disabled);
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let service = service(test_config());
        let mut message = service.render_reminder(&reminder(None), "tok").unwrap();
        message.to = "not-an-address".to_string();
        assert!(matches!(
            service.build_message(message),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
