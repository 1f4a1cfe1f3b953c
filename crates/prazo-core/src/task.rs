use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Days, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, SecondsFormat,
    SubsecRound, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1e_2a4c_8d3b_4e57_9a60_b2c4_d8e1_f305);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Stable id for records persisted before ids existed, keyed on the
    /// creation timestamp exactly as it was stored.
    pub fn from_legacy_timestamp(timestamp: &str) -> Self {
        Self(Uuid::new_v5(&LEGACY_ID_NAMESPACE, timestamp.as_bytes()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TaskId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position of a task in the forward-only pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Todo,
    InProgress,
    Completed,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Todo, Stage::InProgress, Stage::Completed];

    /// `None` once the task reached the terminal stage.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Todo => Some(Stage::InProgress),
            Stage::InProgress => Some(Stage::Completed),
            Stage::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Stage::Todo => "todo",
            Stage::InProgress => "inProgress",
            Stage::Completed => "completed",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Stage::Todo => "todo",
            Stage::InProgress => "in-progress",
            Stage::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Todo => "To do",
            Stage::InProgress => "In progress",
            Stage::Completed => "Completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Stage::Todo),
            "in-progress" | "inprogress" | "in_progress" | "doing" => Ok(Stage::InProgress),
            "completed" | "done" => Ok(Stage::Completed),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 3] = [TimeUnit::Minutes, TimeUnit::Hours, TimeUnit::Days];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }

    /// Adds `amount` units to `from`. Days are calendar days in local time.
    pub fn offset(self, from: DateTime<Utc>, amount: u32) -> Option<DateTime<Utc>> {
        self.offset_in(&Local, from, amount)
    }

    /// Like [`TimeUnit::offset`], with days counted on the wall clock of `tz`.
    ///
    /// A wall time repeated by a DST fall-back resolves to its earlier
    /// instant; one skipped by a spring-forward keeps the pre-gap offset and
    /// so lands past the gap.
    pub fn offset_in<Tz: TimeZone>(
        self,
        tz: &Tz,
        from: DateTime<Utc>,
        amount: u32,
    ) -> Option<DateTime<Utc>> {
        let amount_i64 = i64::from(amount);
        match self {
            TimeUnit::Minutes => {
                from.checked_add_signed(TimeDelta::try_minutes(amount_i64)?)
            }
            TimeUnit::Hours => from.checked_add_signed(TimeDelta::try_hours(amount_i64)?),
            TimeUnit::Days => {
                let wall = from
                    .with_timezone(tz)
                    .naive_local()
                    .checked_add_days(Days::new(u64::from(amount)))?;
                resolve_wall_time(tz, wall)
            }
        }
    }
}

fn resolve_wall_time<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let before_gap = wall.checked_sub_signed(TimeDelta::days(1))?;
            let offset = tz.offset_from_local_datetime(&before_gap).earliest()?.fix();
            let utc = wall.checked_sub_signed(TimeDelta::seconds(i64::from(
                offset.local_minus_utc(),
            )))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutes" | "minute" | "min" | "m" => Ok(TimeUnit::Minutes),
            "hours" | "hour" | "h" => Ok(TimeUnit::Hours),
            "days" | "day" | "d" => Ok(TimeUnit::Days),
            _ => Err(ValidationError::InvalidUnit(s.to_string())),
        }
    }
}

/// Raw user input for a new task, validated by [`TaskRecord::from_draft`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub deadline_date: String,
    pub amount: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire", into = "TaskWire")]
pub struct TaskRecord {
    pub id: TaskId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub notified: bool,
}

impl TaskRecord {
    pub fn from_draft(draft: &TaskDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let date = draft.deadline_date.trim();
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let amount = draft
            .amount
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| ValidationError::InvalidAmount(draft.amount.clone()))?;

        let unit: TimeUnit = draft.unit.parse()?;

        let created_at = now.trunc_subsecs(3);
        let deadline = unit
            .offset(created_at, amount)
            .ok_or(ValidationError::DeadlineOutOfRange {
                amount,
                unit: unit.as_str(),
            })?;

        Ok(Self {
            id: TaskId::new(),
            text: text.to_string(),
            created_at,
            deadline,
            notified: false,
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }
}

/// Persisted shape of a record, ISO-8601 timestamps as browsers write them.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    text: String,
    timestamp: String,
    deadline: String,
    #[serde(default)]
    notified: bool,
}

impl TryFrom<TaskWire> for TaskRecord {
    type Error = String;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let text = wire.text.trim();
        if text.is_empty() {
            return Err("task text is empty".to_string());
        }
        let created_at = parse_iso(&wire.timestamp)
            .ok_or_else(|| format!("invalid timestamp `{}`", wire.timestamp))?;
        let deadline = parse_iso(&wire.deadline)
            .ok_or_else(|| format!("invalid deadline `{}`", wire.deadline))?;
        if deadline < created_at {
            return Err(format!(
                "deadline {} precedes creation {}",
                wire.deadline, wire.timestamp
            ));
        }

        let id = wire
            .id
            .map(TaskId::from)
            .unwrap_or_else(|| TaskId::from_legacy_timestamp(&wire.timestamp));

        Ok(Self {
            id,
            text: text.to_string(),
            created_at,
            deadline,
            notified: wire.notified,
        })
    }
}

impl From<TaskRecord> for TaskWire {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: Some(record.id.as_uuid()),
            text: record.text,
            timestamp: format_iso(record.created_at),
            deadline: format_iso(record.deadline),
            notified: record.notified,
        }
    }
}

pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
