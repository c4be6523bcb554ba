//! Background job scheduler and the reminder engine's periodic jobs.

mod scheduler;
mod send_reminders;
mod token_cleanup;

pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use send_reminders::SendRemindersJob;
pub use token_cleanup::TokenCleanupJob;
