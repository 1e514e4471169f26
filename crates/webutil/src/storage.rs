use std::collections::HashMap;

/// `localStorage`-shaped key/value store.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
    fn remove_item(&mut self, key: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// The session token, if one is stored.
pub fn get_token(storage: &impl Storage) -> Option<String> {
    let token = storage.get_item("token");
    if token.is_none() {
        log::debug!(target: "webutil.storage", "no token in storage");
    }
    token
}
