//! Configuration access port.
//!
//! Typed getters return `Ok(None)` for an absent key and `Err` with a short
//! description when the key is present but its value does not parse.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_f64(&self, section: &str, key: &str) -> Result<Option<f64>, String>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String>;

    /// Comma-separated value split into trimmed items. Empty items are kept
    /// so callers can reject them.
    fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.get_string(section, key)
            .map(|raw| raw.split(',').map(|item| item.trim().to_string()).collect())
    }
}
