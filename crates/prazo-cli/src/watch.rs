use std::io::{self, IsTerminal, Write};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use prazo_core::clock::format_clock;
use prazo_core::{DeadlineMonitor, KeyValueStore, Lifecycle, Notification, ReminderSurface};
use tracing::{debug, info};

use crate::config::Config;
use crate::render::Renderer;

const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// What one pass of the watch loop produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub clock: String,
    pub notifications: Vec<Notification>,
    pub banner: Option<String>,
    pub banner_hidden: bool,
}

/// Clock, deadline monitor and reminder banner driven from one loop, so
/// registry mutations never interleave.
#[derive(Debug)]
pub struct Watcher {
    monitor: DeadlineMonitor,
    surface: ReminderSurface,
}

impl Watcher {
    pub fn new(monitor_period: Duration, banner_duration: Duration) -> Self {
        Self {
            monitor: DeadlineMonitor::new(monitor_period),
            surface: ReminderSurface::new(banner_duration),
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(cfg.monitor_interval()?, cfg.reminder_duration()?))
    }

    #[tracing::instrument(skip(self, lifecycle, now))]
    pub fn tick<S: KeyValueStore>(
        &mut self,
        lifecycle: &mut Lifecycle<S>,
        now: DateTime<Utc>,
    ) -> TickReport {
        let mut notifications = Vec::new();
        if self.monitor.is_due(now) {
            lifecycle.reload();
            notifications = lifecycle.check_deadlines(&mut self.monitor, now);
            debug!(raised = notifications.len(), "deadline check finished");
        }

        for notification in &notifications {
            self.surface.show(notification, now);
        }
        let banner_hidden = self.surface.expire(now);

        TickReport {
            clock: format_clock(&now.with_timezone(&Local)),
            banner: self.surface.visible(now).map(str::to_string),
            notifications,
            banner_hidden,
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn run<S: KeyValueStore>(
    lifecycle: &mut Lifecycle<S>,
    cfg: &Config,
    renderer: &Renderer,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let mut watcher = Watcher::from_config(cfg)?;
    let bell = cfg.reminder_bell();
    let live = io::stdout().is_terminal();
    info!(
        monitor_secs = watcher.monitor.period().num_seconds(),
        banner_secs = watcher.surface.duration().num_seconds(),
        bell,
        "watching deadlines"
    );

    let mut out = io::stdout().lock();
    let mut ticks = 0_u64;
    loop {
        let report = watcher.tick(lifecycle, Utc::now());

        for notification in &report.notifications {
            if live {
                write!(out, "\r\x1b[2K")?;
            }
            writeln!(out, "{}", renderer.banner(&notification.message()))?;
            if bell {
                write!(out, "\x07")?;
            }
        }

        if live {
            write!(out, "\r\x1b[2K{}", report.clock)?;
            if let Some(banner) = &report.banner {
                write!(out, "  {}", renderer.banner(banner))?;
            }
            out.flush()?;
        } else if report.banner_hidden {
            debug!("banner expired");
        }

        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        thread::sleep(CLOCK_PERIOD);
    }

    if live {
        writeln!(out)?;
    }
    Ok(())
}
