//! Configuration access port trait.
//!
//! Values come back raw; typing and range checks belong to
//! [`EngineConfig`](crate::domain::engine_config::EngineConfig).

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is absent or not a recognised boolean.
    fn get_bool(&self, section: &str, key: &str) -> Option<bool>;

    /// Section names present in the source, lowercased.
    fn sections(&self) -> Vec<String>;
}
