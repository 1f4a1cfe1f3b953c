use prazo_core::{
  KeyValueStore,
  StorageError
};
use web_sys::Storage;

/// `window.localStorage`, or nothing when the host refuses access
/// (private browsing, sandboxed frames). Reads then fail softly and the
/// task registry starts empty.
#[derive(Clone)]
pub struct LocalStorage {
  inner: Option<Storage>
}

impl LocalStorage {
  pub fn new() -> Self {
    let inner = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });

    if inner.is_none() {
      tracing::warn!(
        "localStorage unavailable; \
         changes will not survive a reload"
      );
    }

    Self {
      inner
    }
  }

  fn storage(
    &self
  ) -> Result<&Storage, StorageError> {
    self.inner.as_ref().ok_or_else(
      || {
        StorageError::Unavailable(
          "window.localStorage"
            .to_string()
        )
      }
    )
  }
}

impl KeyValueStore for LocalStorage {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    self
      .storage()?
      .get_item(key)
      .map_err(|err| {
        StorageError::Read {
          key:     key.to_string(),
          message: format!("{err:?}")
        }
      })
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    self
      .storage()?
      .set_item(key, value)
      .map_err(|err| {
        StorageError::Write {
          key:     key.to_string(),
          message: format!("{err:?}")
        }
      })
  }
}
