use serde::Serialize;

use crate::task::{Stage, TaskId, TaskRecord};

/// Task records grouped by stage, each sequence in insertion order.
///
/// An id lives in at most one stage; [`Registry::insert`] enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    todo: Vec<TaskRecord>,
    in_progress: Vec<TaskRecord>,
    completed: Vec<TaskRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, stage: Stage) -> &[TaskRecord] {
        match stage {
            Stage::Todo => &self.todo,
            Stage::InProgress => &self.in_progress,
            Stage::Completed => &self.completed,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut Vec<TaskRecord> {
        match stage {
            Stage::Todo => &mut self.todo,
            Stage::InProgress => &mut self.in_progress,
            Stage::Completed => &mut self.completed,
        }
    }

    /// Appends `record` unless its id is already present in any stage.
    pub fn insert(&mut self, stage: Stage, record: TaskRecord) -> bool {
        if self.contains(record.id) {
            tracing::debug!(id = %record.id, stage = %stage, "ignoring duplicate task");
            return false;
        }
        self.stage_mut(stage).push(record);
        true
    }

    pub fn take(&mut self, stage: Stage, id: TaskId) -> Option<TaskRecord> {
        let list = self.stage_mut(stage);
        let idx = list.iter().position(|record| record.id == id)?;
        Some(list.remove(idx))
    }

    pub fn remove(&mut self, stage: Stage, id: TaskId) -> bool {
        self.take(stage, id).is_some()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.stage_of(id).is_some()
    }

    pub fn stage_of(&self, id: TaskId) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| self.stage(*stage).iter().any(|record| record.id == id))
    }

    pub fn get(&self, id: TaskId) -> Option<(Stage, &TaskRecord)> {
        self.iter().find(|(_, record)| record.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &TaskRecord)> {
        Stage::ALL
            .into_iter()
            .flat_map(move |stage| self.stage(stage).iter().map(move |record| (stage, record)))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = (Stage, &mut TaskRecord)> {
        let Registry {
            todo,
            in_progress,
            completed,
        } = self;
        todo.iter_mut()
            .map(|record| (Stage::Todo, record))
            .chain(in_progress.iter_mut().map(|record| (Stage::InProgress, record)))
            .chain(completed.iter_mut().map(|record| (Stage::Completed, record)))
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
