use web_sys::Storage;

use kaiten_core::{KeyValueStore, MemoryStore, Stores};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StorageScope {
    Local,
    Session,
}

impl StorageScope {
    fn label(self) -> &'static str {
        match self {
            StorageScope::Local => "localStorage",
            StorageScope::Session => "sessionStorage",
        }
    }
}

pub(crate) struct WebStore {
    scope: StorageScope,
    storage: Storage,
}

impl WebStore {
    pub(crate) fn open(scope: StorageScope) -> Option<Self> {
        let window = web_sys::window()?;
        let storage = match scope {
            StorageScope::Local => window.local_storage(),
            StorageScope::Session => window.session_storage(),
        };
        match storage {
            Ok(Some(storage)) => Some(Self { scope, storage }),
            _ => {
                gloo::console::warn!(format!("storage: {} unavailable", scope.label()));
                None
            }
        }
    }
}

impl KeyValueStore for WebStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            gloo::console::warn!(format!("storage: {} write failed for {key}", self.scope.label()));
        }
    }

    fn remove(&mut self, key: &str) {
        if self.storage.remove_item(key).is_err() {
            gloo::console::warn!(format!("storage: {} remove failed for {key}", self.scope.label()));
        }
    }
}

fn open_or_memory(scope: StorageScope) -> Box<dyn KeyValueStore> {
    match WebStore::open(scope) {
        Some(store) => Box::new(store),
        None => Box::new(MemoryStore::new()),
    }
}

pub(crate) fn browser_stores() -> Stores {
    Stores {
        local: open_or_memory(StorageScope::Local),
        session: open_or_memory(StorageScope::Session),
    }
}
