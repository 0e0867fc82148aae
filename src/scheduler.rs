use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::services::{analytics_service, inventory_service, product_service};

/// Days of analytics history kept by the weekly cleanup job.
const ANALYTICS_RETENTION_DAYS: i64 = 90;

/// When a background job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Every(Duration),
    DailyAt { hour: u32 },
    Weekly { weekday: Weekday, hour: u32 },
}

impl Cadence {
    /// Time until the next tick, measured from `now`.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Cadence::Every(interval) => *interval,
            Cadence::DailyAt { hour } => {
                let mut candidate = at_hour(now.date_naive(), *hour);
                if candidate <= now {
                    candidate = at_hour(now.date_naive() + Days::new(1), *hour);
                }
                (candidate - now).to_std().unwrap_or_default()
            }
            Cadence::Weekly { weekday, hour } => {
                let today = now.date_naive();
                let days_ahead = (weekday.num_days_from_monday() + 7
                    - today.weekday().num_days_from_monday())
                    % 7;
                let mut candidate = at_hour(today + Days::new(u64::from(days_ahead)), *hour);
                if candidate <= now {
                    candidate = at_hour(today + Days::new(u64::from(days_ahead + 7)), *hour);
                }
                (candidate - now).to_std().unwrap_or_default()
            }
        }
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default();
    date.and_time(time).and_utc()
}

/// Owns the background job tasks. Jobs run until [`Scheduler::stop`] flips the
/// shutdown channel; a failing tick is logged and the loop keeps going.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(conn: DatabaseConnection) -> Self {
        let (shutdown, _) = watch::channel(false);
        let mut handles = Vec::new();

        handles.push(spawn_job(
            "alert_sweep",
            Cadence::Every(Duration::from_secs(60 * 60)),
            shutdown.subscribe(),
            {
                let conn = conn.clone();
                move || {
                    let conn = conn.clone();
                    async move { inventory_service::sweep_alerts(&conn).await.map(|n| n as u64) }
                }
            },
        ));

        handles.push(spawn_job(
            "demand_predictions",
            Cadence::DailyAt { hour: 2 },
            shutdown.subscribe(),
            {
                let conn = conn.clone();
                move || {
                    let conn = conn.clone();
                    async move {
                        inventory_service::update_demand_predictions(&conn)
                            .await
                            .map(|n| n as u64)
                    }
                }
            },
        ));

        handles.push(spawn_job(
            "health_rescore",
            Cadence::DailyAt { hour: 3 },
            shutdown.subscribe(),
            {
                let conn = conn.clone();
                move || {
                    let conn = conn.clone();
                    async move {
                        product_service::recompute_health_scores(
                            &conn,
                            &product_service::RESCORED_CATEGORIES,
                        )
                        .await
                        .map(|n| n as u64)
                    }
                }
            },
        ));

        handles.push(spawn_job(
            "analytics_cleanup",
            Cadence::Weekly {
                weekday: Weekday::Mon,
                hour: 4,
            },
            shutdown.subscribe(),
            {
                let conn = conn.clone();
                move || {
                    let conn = conn.clone();
                    async move {
                        analytics_service::cleanup_older_than(&conn, ANALYTICS_RETENTION_DAYS).await
                    }
                }
            },
        ));

        Self { shutdown, handles }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

fn spawn_job<F, Fut>(
    name: &'static str,
    cadence: Cadence,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<u64>> + Send,
{
    tokio::spawn(async move {
        tracing::info!(job = name, "scheduler job started");
        loop {
            let delay = cadence.next_delay(Utc::now());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match job().await {
                        Ok(count) => tracing::info!(job = name, count, "job tick done"),
                        Err(err) => tracing::error!(job = name, error = %err, "job tick failed"),
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!(job = name, "scheduler job stopping");
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn fixed_interval_is_constant() {
        let cadence = Cadence::Every(Duration::from_secs(3600));
        assert_eq!(
            cadence.next_delay(utc(2025, 6, 2, 13, 37)),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn daily_before_the_hour_fires_same_day() {
        let cadence = Cadence::DailyAt { hour: 2 };
        let delay = cadence.next_delay(utc(2025, 6, 2, 1, 0));
        assert_eq!(delay, Duration::from_secs(3600));
    }

    #[test]
    fn daily_after_the_hour_fires_next_day() {
        let cadence = Cadence::DailyAt { hour: 2 };
        let delay = cadence.next_delay(utc(2025, 6, 2, 3, 0));
        assert_eq!(delay, Duration::from_secs(23 * 3600));
    }

    #[test]
    fn daily_exactly_on_the_hour_waits_a_full_day() {
        let cadence = Cadence::DailyAt { hour: 2 };
        let delay = cadence.next_delay(utc(2025, 6, 2, 2, 0));
        assert_eq!(delay, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn weekly_targets_the_requested_weekday() {
        // 2025-06-02 is a Monday.
        let cadence = Cadence::Weekly {
            weekday: Weekday::Mon,
            hour: 4,
        };
        let delay = cadence.next_delay(utc(2025, 6, 2, 3, 0));
        assert_eq!(delay, Duration::from_secs(3600));

        // Past 04:00 Monday rolls a full week ahead.
        let delay = cadence.next_delay(utc(2025, 6, 2, 5, 0));
        assert_eq!(delay, Duration::from_secs(7 * 24 * 3600 - 3600));
    }

    #[tokio::test]
    async fn job_exits_when_shutdown_is_signalled() {
        let (tx, rx) = watch::channel(false);
        let handle = spawn_job(
            "noop",
            Cadence::Every(Duration::from_secs(3600)),
            rx,
            || async { Ok::<u64, crate::error::AppError>(0) },
        );

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("job should stop before its next tick")
            .unwrap();
    }

    #[test]
    fn weekly_from_midweek_counts_forward() {
        // 2025-06-04 is a Wednesday; next Monday 04:00 is 5 days minus 8 hours away.
        let cadence = Cadence::Weekly {
            weekday: Weekday::Mon,
            hour: 4,
        };
        let delay = cadence.next_delay(utc(2025, 6, 4, 12, 0));
        assert_eq!(delay, Duration::from_secs(5 * 24 * 3600 - 8 * 3600));
    }
}
