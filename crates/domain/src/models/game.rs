//! Game domain model.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Display format for game times in reminders, e.g. `Mon Jan 2 3:04PM`.
pub const GAME_TIME_FORMAT: &str = "%a %b %-d %-I:%M%p";

/// A scheduled game. Every game belongs to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub team_id: i64,
    pub season_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub description: String,
}

impl Game {
    /// True when the game starts after `now` and no later than `now + window`.
    pub fn is_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.starts_at > now && self.starts_at <= now + window
    }

    /// Start time rendered in the given display offset.
    pub fn display_time(&self, offset: FixedOffset) -> String {
        self.starts_at
            .with_timezone(&offset)
            .format(GAME_TIME_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn game_at(starts_at: DateTime<Utc>) -> Game {
        Game {
            id: 1,
            team_id: 1,
            season_id: None,
            starts_at,
            description: "Owls vs Hawks".to_string(),
        }
    }

    #[test]
    fn test_is_within_window() {
        let now = Utc::now();
        let window = Duration::days(5);

        assert!(game_at(now + Duration::days(2)).is_within(now, window));
        assert!(game_at(now + window).is_within(now, window));
        assert!(!game_at(now + Duration::days(6)).is_within(now, window));
        assert!(!game_at(now - Duration::hours(1)).is_within(now, window));
    }

    #[test]
    fn test_display_time() {
        let game = game_at(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 0).unwrap());
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(game.display_time(utc), "Mon Jan 2 3:04PM");

        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        assert_eq!(game.display_time(pacific), "Mon Jan 2 7:04AM");
    }
}
