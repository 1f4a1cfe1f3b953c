use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::monitor::Notification;

pub const DEFAULT_BANNER_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

/// Transient banner region. A new notification replaces the current banner
/// and restarts its display window.
#[derive(Debug, Clone)]
pub struct ReminderSurface {
    duration: TimeDelta,
    current: Option<Banner>,
}

impl Default for ReminderSurface {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_DURATION)
    }
}

impl ReminderSurface {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: TimeDelta::from_std(duration).unwrap_or(TimeDelta::seconds(5)),
            current: None,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    pub fn show(&mut self, notification: &Notification, now: DateTime<Utc>) -> &Banner {
        self.current.insert(Banner {
            message: notification.message(),
            shown_at: now,
        })
    }

    pub fn visible(&self, now: DateTime<Utc>) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|banner| now < banner.shown_at + self.duration)
            .map(|banner| banner.message.as_str())
    }

    /// Drops an expired banner; returns whether one was hidden.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.current.is_some() && self.visible(now).is_none() {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::task::{Stage, TaskId};

    fn notification(text: &str) -> Notification {
        Notification {
            task_id: TaskId::new(),
            stage: Stage::Todo,
            text: text.to_string(),
            deadline: Utc::now(),
        }
    }

    #[test]
    fn banner_hides_after_duration() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
            .single()
            .expect("valid time");
        let mut surface = ReminderSurface::default();
        surface.show(&notification("Buy milk"), now);

        assert_eq!(
            surface.visible(now + TimeDelta::seconds(4)),
            Some("Tarefa \"Buy milk\" está atrasada!")
        );
        assert!(!surface.expire(now + TimeDelta::seconds(4)));
        assert_eq!(surface.visible(now + TimeDelta::seconds(5)), None);
        assert!(surface.expire(now + TimeDelta::seconds(5)));
        assert!(!surface.expire(now + TimeDelta::seconds(6)));
    }

    #[test]
    fn latest_notification_wins() {
        let now = Utc::now();
        let mut surface = ReminderSurface::default();
        surface.show(&notification("first"), now);
        surface.show(&notification("second"), now + TimeDelta::seconds(3));
        assert_eq!(
            surface.visible(now + TimeDelta::seconds(7)),
            Some("Tarefa \"second\" está atrasada!")
        );
    }
}
