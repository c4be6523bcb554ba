//! Periodic reminder batch.

use tracing::info;

use crate::services::ReminderScheduler;

use super::scheduler::{Job, JobFrequency};

pub struct SendRemindersJob {
    scheduler: ReminderScheduler,
    every_minutes: u64,
}

impl SendRemindersJob {
    pub fn new(scheduler: ReminderScheduler, every_minutes: u64) -> Self {
        Self {
            scheduler,
            every_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for SendRemindersJob {
    fn name(&self) -> &'static str {
        "send_reminders"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.every_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let report = self
            .scheduler
            .send_game_reminders()
            .await
            .map_err(|e| format!("Reminder batch aborted: {}", e))?;

        for (team, status) in &report.teams {
            info!(team = %team, status = %status.message, "Team reminder status");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RemindersConfig, TokensConfig};
    use crate::services::TokenService;
    use chrono::{Duration, Utc};
    use domain::services::{Channel, MockReminderChannel};
    use domain::testing::MemoryStore;
    use std::sync::Arc;

    fn job(store: Arc<MemoryStore>, email: Arc<MockReminderChannel>) -> SendRemindersJob {
        let tokens = TokenService::new(store.clone(), store.clone(), &TokensConfig::default());
        let config = RemindersConfig {
            base_url: "https://rsvp.test".to_string(),
            lookahead_days: 5,
            max_concurrent_sends: 2,
            schedule_minutes: 30,
            display_utc_offset_minutes: 0,
        };
        let scheduler = ReminderScheduler::new(
            store.clone(),
            store.clone(),
            store,
            tokens,
            email,
            Arc::new(MockReminderChannel::new(Channel::Sms)),
            &config,
        );
        SendRemindersJob::new(scheduler, config.schedule_minutes)
    }

    #[tokio::test]
    async fn test_execute_runs_batch() {
        let store = Arc::new(MemoryStore::new());
        store.add_team(1, "Owls", None);
        store.add_game(10, 1, Utc::now() + Duration::days(1), "Owls vs Hawks");
        store.add_player(1, "Sam", "sam@example.com", None);
        store.add_membership(1, 1, true, false);
        let email = Arc::new(MockReminderChannel::new(Channel::Email));

        let job = job(store.clone(), email.clone());
        assert_eq!(job.name(), "send_reminders");
        assert_eq!(job.frequency(), JobFrequency::Minutes(30));

        job.execute().await.unwrap();
        assert_eq!(email.attempts(), 1);
        assert!(store.rsvp(1, 10).unwrap().reminder_sent);
    }

    #[tokio::test]
    async fn test_execute_reports_fatal_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_roster_unavailable(true);
        let job = job(store, Arc::new(MockReminderChannel::new(Channel::Email)));

        let err = job.execute().await.unwrap_err();
        assert!(err.starts_with("Reminder batch aborted"));
    }
}
