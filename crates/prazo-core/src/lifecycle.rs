use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::error::ValidationError;
use crate::monitor::{DeadlineMonitor, Notification};
use crate::registry::Registry;
use crate::store::{KeyValueStore, TaskStore};
use crate::task::{Stage, TaskDraft, TaskId, TaskRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Stage),
    NoOp,
}

/// Owns the registry and its store; every mutation is followed by a save.
///
/// Saves are best-effort: a failing backend is logged and the in-memory
/// registry stays authoritative.
#[derive(Debug)]
pub struct Lifecycle<S> {
    registry: Registry,
    store: TaskStore<S>,
}

impl<S: KeyValueStore> Lifecycle<S> {
    #[tracing::instrument(skip_all)]
    pub fn open(backend: S) -> Self {
        let store = TaskStore::new(backend);
        let registry = store.load();
        info!(tasks = registry.len(), "task registry ready");
        Self { registry, store }
    }

    /// Re-reads the store, picking up writes made by other processes.
    ///
    /// `notified` only ever goes from false to true, so markers set in memory
    /// survive even when the save that should have recorded them failed.
    #[tracing::instrument(skip_all)]
    pub fn reload(&mut self) {
        let notified: BTreeSet<TaskId> = self
            .registry
            .iter()
            .filter(|(_, record)| record.notified)
            .map(|(_, record)| record.id)
            .collect();

        let mut fresh = self.store.load();
        let mut carried = 0_usize;
        for (_, record) in fresh.records_mut() {
            if !record.notified && notified.contains(&record.id) {
                record.notified = true;
                carried += 1;
            }
        }
        if carried > 0 {
            debug!(carried, "kept unsaved notified markers");
        }
        self.registry = fresh;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn backend(&self) -> &S {
        self.store.backend()
    }

    pub fn backend_mut(&mut self) -> &mut S {
        self.store.backend_mut()
    }

    #[tracing::instrument(skip(self, draft), fields(unit = %draft.unit, amount = %draft.amount))]
    pub fn create_task(
        &mut self,
        draft: &TaskDraft,
        now: DateTime<Utc>,
    ) -> Result<TaskRecord, ValidationError> {
        let record = TaskRecord::from_draft(draft, now).inspect_err(|err| {
            warn!(
                error = %err,
                text = %draft.text,
                date = %draft.deadline_date,
                amount = %draft.amount,
                "rejected task input"
            );
        })?;

        self.registry.insert(Stage::Todo, record.clone());
        info!(id = %record.id, deadline = %record.deadline, "created task");
        self.persist();
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    pub fn move_task(&mut self, id: TaskId, current: Stage) -> MoveOutcome {
        let Some(next) = current.next() else {
            debug!("task already in terminal stage");
            return MoveOutcome::NoOp;
        };
        let Some(record) = self.registry.take(current, id) else {
            warn!("task not found in stage, nothing to move");
            return MoveOutcome::NoOp;
        };

        self.registry.insert(next, record);
        info!(to = %next, "moved task");
        self.persist();
        MoveOutcome::Moved(next)
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_task(&mut self, id: TaskId, stage: Stage) {
        if self.registry.remove(stage, id) {
            info!("removed task");
        } else {
            debug!("task already absent");
        }
        self.persist();
    }

    #[tracing::instrument(skip(self, monitor))]
    pub fn check_deadlines(
        &mut self,
        monitor: &mut DeadlineMonitor,
        now: DateTime<Utc>,
    ) -> Vec<Notification> {
        let raised = monitor.scan(&mut self.registry, now);
        if !raised.is_empty() {
            self.persist();
        }
        raised
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.registry) {
            error!(error = %err, "failed to persist tasks");
        }
    }
}
