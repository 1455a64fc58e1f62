//! Browser `localStorage` backend for WASM.

use super::{Storage, StorageError, StorageResult};
use wasm_bindgen::JsValue;

/// Storage backed by the browser's `window.localStorage`.
///
/// Values are stored as UTF-8 strings; non-UTF-8 bytes are rejected.
pub struct LocalStorage {
    inner: web_sys::Storage,
}

fn js_error(context: &str, err: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{}: {:?}", context, err))
}

impl LocalStorage {
    /// Open the window's local storage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(|e| js_error("localStorage access denied", e))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner
            .get_item(key)
            .map(|value| value.map(String::into_bytes))
            .map_err(|e| js_error("getItem failed", e))
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let text = std::str::from_utf8(value)
            .map_err(|e| StorageError::Serialization(format!("Value is not UTF-8: {}", e)))?;
        // Quota errors surface here.
        self.inner
            .set_item(key, text)
            .map_err(|e| js_error("setItem failed", e))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner
            .remove_item(key)
            .map_err(|e| js_error("removeItem failed", e))
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let len = self.inner.length().map_err(|e| js_error("length failed", e))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.inner.key(i).map_err(|e| js_error("key failed", e))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
