use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::registry::Registry;
use crate::task::{Stage, TaskId};

pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// One overdue task, raised once per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub task_id: TaskId,
    pub stage: Stage,
    pub text: String,
    pub deadline: DateTime<Utc>,
}

impl Notification {
    pub fn message(&self) -> String {
        format!("Tarefa \"{}\" está atrasada!", self.text)
    }
}

/// Periodic deadline check.
///
/// Eligibility is `now >= deadline`, evaluated whenever a tick happens to
/// run, so a host that delays timers only delays the notification.
#[derive(Debug, Clone)]
pub struct DeadlineMonitor {
    period: TimeDelta,
    last_tick: Option<DateTime<Utc>>,
}

impl Default for DeadlineMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl DeadlineMonitor {
    pub fn new(period: Duration) -> Self {
        let period = TimeDelta::from_std(period)
            .ok()
            .filter(|period| *period > TimeDelta::zero())
            .unwrap_or(TimeDelta::seconds(60));
        Self {
            period,
            last_tick: None,
        }
    }

    pub fn period(&self) -> TimeDelta {
        self.period
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now - last >= self.period,
        }
    }

    /// Marks every pending overdue record as notified and returns one
    /// notification per newly marked record.
    #[tracing::instrument(skip_all, fields(tasks = registry.len()))]
    pub fn scan(&mut self, registry: &mut Registry, now: DateTime<Utc>) -> Vec<Notification> {
        self.last_tick = Some(now);

        let mut raised = Vec::new();
        for (stage, record) in registry.records_mut() {
            if record.notified || !record.is_overdue(now) {
                continue;
            }
            record.notified = true;
            info!(id = %record.id, stage = %stage, "task is overdue");
            raised.push(Notification {
                task_id: record.id,
                stage,
                text: record.text.clone(),
                deadline: record.deadline,
            });
        }
        raised
    }
}
