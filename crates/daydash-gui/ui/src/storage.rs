use daydash_engine::{
  Store,
  StoreError
};
use web_sys::Storage;

/// `window.localStorage` behind the engine's key/value seam.
pub struct BrowserStore {
  storage: Option<Storage>
}

impl BrowserStore {
  pub fn open() -> Self {
    let storage = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });
    if storage.is_none() {
      tracing::warn!(
        "localStorage unavailable; \
         dashboard changes will not \
         survive a reload"
      );
    }
    Self {
      storage
    }
  }
}

impl Store for BrowserStore {
  fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self
      .storage
      .as_ref()?
      .get_item(key)
      .ok()
      .flatten()
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StoreError> {
    let Some(storage) =
      self.storage.as_ref()
    else {
      return Ok(());
    };
    storage
      .set_item(key, value)
      .map_err(|err| {
        StoreError::Write {
          key: key.to_string(),
          message: format!("{err:?}")
        }
      })
  }

  fn remove(
    &mut self,
    key: &str
  ) -> Result<(), StoreError> {
    let Some(storage) =
      self.storage.as_ref()
    else {
      return Ok(());
    };
    storage
      .remove_item(key)
      .map_err(|err| {
        StoreError::Remove {
          key: key.to_string(),
          message: format!("{err:?}")
        }
      })
  }

  fn keys(&self) -> Vec<String> {
    let Some(storage) =
      self.storage.as_ref()
    else {
      return Vec::new();
    };
    let len =
      storage.length().unwrap_or(0);
    (0..len)
      .filter_map(|idx| {
        storage.key(idx).ok().flatten()
      })
      .collect()
  }
}
