//! Reminder scheduler: one batch pass over every roster.
//!
//! For each team the next game inside the lookahead window is resolved once.
//! Every player without a reply and without a previous reminder is sent one
//! per enabled channel. Pairs with at least one successful send are marked in
//! a single bulk write at the end of the pass, so a crash mid-batch only ever
//! causes a resend on the next run.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use domain::models::{DueReminder, Game, Player, ReminderReport, RosterMembership, Team, TeamReminderStatus};
use domain::services::{
    Channel, ChannelError, PlayerDirectory, ReminderChannel, ReminderMessage, RosterDirectory,
    RsvpStore,
};
use domain::DomainError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::tokens::TokenService;
use crate::config::RemindersConfig;
use crate::middleware::metrics::{record_reminder_batch, record_reminder_failed, record_reminder_sent};

/// Result of one channel attempt. `None` when the player opted out or the
/// channel is disabled.
type Attempt = Option<Result<(), ChannelError>>;

struct DispatchOutcome {
    player_id: i64,
    email: Attempt,
    sms: Attempt,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    rsvps: Arc<dyn RsvpStore>,
    roster: Arc<dyn RosterDirectory>,
    players: Arc<dyn PlayerDirectory>,
    tokens: TokenService,
    email: Arc<dyn ReminderChannel>,
    sms: Arc<dyn ReminderChannel>,
    lookahead: Duration,
    max_concurrent_sends: usize,
}

impl ReminderScheduler {
    pub fn new(
        rsvps: Arc<dyn RsvpStore>,
        roster: Arc<dyn RosterDirectory>,
        players: Arc<dyn PlayerDirectory>,
        tokens: TokenService,
        email: Arc<dyn ReminderChannel>,
        sms: Arc<dyn ReminderChannel>,
        config: &RemindersConfig,
    ) -> Self {
        Self {
            rsvps,
            roster,
            players,
            tokens,
            email,
            sms,
            lookahead: config.lookahead(),
            max_concurrent_sends: config.max_concurrent_sends.max(1),
        }
    }

    /// Runs one batch pass. Only roster and store failures are returned;
    /// delivery failures are counted in the report.
    pub async fn send_game_reminders(&self) -> Result<ReminderReport, DomainError> {
        self.run_at(Utc::now()).await
    }

    /// Roster rows due for a reminder, without sending anything.
    pub async fn preview(&self) -> Result<Vec<DueReminder>, DomainError> {
        self.rsvps.find_due(Utc::now(), self.lookahead).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ReminderReport, DomainError> {
        let started = Instant::now();
        let memberships = self.roster.memberships().await?;
        info!(
            memberships = memberships.len(),
            lookahead_days = self.lookahead.num_days(),
            "Starting reminder batch"
        );

        let mut report = ReminderReport::default();
        let mut batch: Vec<(i64, i64)> = Vec::new();
        let walked = self
            .remind_teams(&memberships, now, &mut report, &mut batch)
            .await;

        // Pairs already delivered are marked even when a later team aborts
        // the batch, so they are not sent again on the next run.
        if !batch.is_empty() {
            match self.rsvps.mark_reminders_sent(&batch).await {
                Ok(marked) => report.marked = marked,
                Err(e) if walked.is_err() => {
                    error!(pairs = batch.len(), error = %e, "Failed to mark delivered reminders");
                }
                Err(e) => return Err(e),
            }
        }

        if let Err(e) = walked {
            error!(
                sent = report.total_sent(),
                marked = report.marked,
                error = %e,
                "Store error after partial delivery"
            );
            return Err(e);
        }

        let elapsed = started.elapsed().as_secs_f64();
        record_reminder_batch(elapsed, report.marked);
        info!(
            teams = report.teams.len(),
            sent = report.total_sent(),
            failed = report.total_failed(),
            marked = report.marked,
            elapsed_secs = elapsed,
            "Reminder batch complete"
        );

        Ok(report)
    }

    /// Walks the roster team by team, recording each team's status in the
    /// report and each delivered pair in `batch`.
    async fn remind_teams(
        &self,
        memberships: &[RosterMembership],
        now: DateTime<Utc>,
        report: &mut ReminderReport,
        batch: &mut Vec<(i64, i64)>,
    ) -> Result<(), DomainError> {
        for team_rows in memberships.chunk_by(|a, b| a.team_id == b.team_id) {
            let team_id = team_rows[0].team_id;
            let Some(team) = self.roster.team(team_id).await? else {
                warn!(team_id, "Roster references unknown team, skipping");
                continue;
            };

            let status = match self
                .roster
                .next_game_for_team(team_id, now, self.lookahead)
                .await?
            {
                None => {
                    debug!(team_id, "No upcoming game inside the window");
                    TeamReminderStatus::no_upcoming_game()
                }
                Some(game) => {
                    let mut status = TeamReminderStatus::default();
                    let sent = self
                        .remind_team(&team, &game, team_rows, &mut status)
                        .await?;
                    batch.extend(sent.into_iter().map(|player_id| (player_id, game.id)));
                    status.summarize(&game);
                    status
                }
            };

            // Teams may share a name and division.
            let mut key = team.report_key();
            if report.teams.contains_key(&key) {
                key = team.unique_report_key();
            }
            report.teams.insert(key, status);
        }
        Ok(())
    }

    /// Dispatches reminders for one team's game. Returns the players with at
    /// least one successful send.
    async fn remind_team(
        &self,
        team: &Team,
        game: &Game,
        rows: &[RosterMembership],
        status: &mut TeamReminderStatus,
    ) -> Result<Vec<i64>, DomainError> {
        let mut due: Vec<(Player, RosterMembership)> = Vec::new();
        for membership in rows {
            let record = self.rsvps.get_or_create(membership.player_id, game.id).await?;
            if !record.needs_reminder() || !membership.wants_reminders() {
                status.skipped += 1;
                continue;
            }

            match self.players.find_by_id(membership.player_id).await? {
                Some(player) => due.push((player, *membership)),
                None => {
                    warn!(player_id = membership.player_id, "Roster references unknown player");
                    status.skipped += 1;
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_sends));
        let mut tasks = JoinSet::new();
        for (player, membership) in due {
            let dispatcher = self.clone();
            let semaphore = semaphore.clone();
            let message = ReminderMessage {
                player,
                game: game.clone(),
                team: team.clone(),
                token: None,
            };
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                dispatcher.dispatch(message, membership).await
            });
        }

        let mut delivered = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(team_id = team.id, error = %e, "Reminder dispatch task failed");
                    continue;
                }
            };

            let email_ok = tally(outcome.email, Channel::Email, status);
            let sms_ok = tally(outcome.sms, Channel::Sms, status);
            if email_ok || sms_ok {
                delivered.push(outcome.player_id);
            }
        }

        delivered.sort_unstable();
        Ok(delivered)
    }

    async fn dispatch(&self, mut message: ReminderMessage, membership: RosterMembership) -> DispatchOutcome {
        let player_id = message.player.id;
        let game_id = message.game.id;

        let email = if membership.remind_email && self.email.is_enabled() {
            match self.tokens.issue_reminder_token(player_id).await {
                Ok(issued) => {
                    message.token = Some(issued.token);
                    Some(self.email.send_reminder(&message).await)
                }
                Err(e) => Some(Err(ChannelError::Render(format!("token issue failed: {e}")))),
            }
        } else {
            None
        };

        let sms = if membership.remind_sms && self.sms.is_enabled() {
            Some(self.sms.send_reminder(&message).await)
        } else {
            None
        };

        for (channel, attempt) in [(Channel::Email, &email), (Channel::Sms, &sms)] {
            if let Some(Err(e)) = attempt {
                if *e != ChannelError::Disabled {
                    warn!(player_id, game_id, channel = %channel, error = %e, "Reminder delivery failed");
                }
            }
        }

        DispatchOutcome {
            player_id,
            email,
            sms,
        }
    }
}

/// Folds one attempt into the team counters. Returns true on success.
fn tally(attempt: Attempt, channel: Channel, status: &mut TeamReminderStatus) -> bool {
    let (sent, failed) = match channel {
        Channel::Email => (&mut status.email_sent, &mut status.email_failed),
        Channel::Sms => (&mut status.sms_sent, &mut status.sms_failed),
    };

    match attempt {
        Some(Ok(())) => {
            *sent += 1;
            record_reminder_sent(channel);
            true
        }
        Some(Err(ChannelError::Disabled)) | None => false,
        Some(Err(_)) => {
            *failed += 1;
            record_reminder_failed(channel);
            false
        }
    }
}
