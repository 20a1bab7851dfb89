//! Configuration access port trait.

use std::collections::BTreeMap;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
    /// Every key with a value in `section`, or `None` if the section is absent.
    fn get_section(&self, section: &str) -> Option<BTreeMap<String, String>>;
}
