//! Configuration access port trait.

/// Read-only access to `[section] key` settings.
///
/// Numeric and boolean getters fall back to `default` when the key is
/// missing or unparsable; callers that must reject bad values read the raw
/// string and validate it themselves.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Comma or whitespace separated list, empty items dropped.
    fn get_list(&self, section: &str, key: &str) -> Vec<String>;
}
