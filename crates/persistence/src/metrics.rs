//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration with its outcome.
pub fn record_query_duration(query_name: &str, outcome: &'static str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string(),
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Called from the readiness probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_player_by_phone");
/// let result = sqlx::query_as::<_, PlayerEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, labelled `ok` or `error` by the query result.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(_) => "error",
        };
        record_query_duration(&self.query_name, outcome, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_name() {
        let timer = QueryTimer::new(String::from("find_due_reminders"));
        assert_eq!(timer.query_name, "find_due_reminders");
    }

    #[test]
    fn test_finish_without_recorder_is_noop() {
        let ok: Result<(), ()> = Ok(());
        QueryTimer::new("noop").finish(&ok);
        let err: Result<(), ()> = Err(());
        QueryTimer::new("noop").finish(&err);
    }
}
