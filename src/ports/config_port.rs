//! Configuration access port trait.
//!
//! Lookups are by INI-style section and key and return the raw value;
//! parsing and validation belong to the caller.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
