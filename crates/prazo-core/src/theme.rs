use tracing::warn;

use crate::error::StorageError;
use crate::store::{DARK_MODE_KEY, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn storage_value(self) -> &'static str {
        if self.is_dark() { "true" } else { "false" }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

pub fn load_theme<S: KeyValueStore + ?Sized>(store: &S) -> ThemeMode {
    match store.get_item(DARK_MODE_KEY) {
        Ok(Some(raw)) if raw.trim() == "true" => ThemeMode::Dark,
        Ok(_) => ThemeMode::Light,
        Err(err) => {
            warn!(error = %err, "theme flag unreadable, using light");
            ThemeMode::Light
        }
    }
}

pub fn save_theme<S: KeyValueStore + ?Sized>(
    store: &mut S,
    mode: ThemeMode,
) -> Result<(), StorageError> {
    store.set_item(DARK_MODE_KEY, mode.storage_value())
}
