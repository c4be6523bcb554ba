//! Reminder engine services and their external integrations.

pub mod cookies;
pub mod email;
pub mod identity;
pub mod inbound_sms;
pub mod links;
pub mod reminders;
pub mod sms;
pub mod tokens;

pub use email::{EmailError, EmailService};
pub use identity::{Credential, IdentityResolver};
pub use inbound_sms::{InboundSms, InboundSmsHandler};
pub use links::RouteLinks;
pub use reminders::ReminderScheduler;
pub use sms::SmsGatewayClient;
pub use tokens::TokenService;
