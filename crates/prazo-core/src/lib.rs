pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod registry;
pub mod reminder;
pub mod store;
pub mod task;
pub mod theme;

pub use error::{StorageError, ValidationError};
pub use lifecycle::{Lifecycle, MoveOutcome};
pub use monitor::{DeadlineMonitor, Notification};
pub use registry::Registry;
pub use reminder::ReminderSurface;
pub use store::{KeyValueStore, MemoryStore, TaskStore};
pub use task::{Stage, TaskDraft, TaskId, TaskRecord, TimeUnit};
pub use theme::ThemeMode;
