//! @ai:module:intent Benchmark configurations, their file format and the configuration store
//! @ai:module:layer domain
//! @ai:module:public_api Configuration, ConfigScene, ConfigWarning, ConfigDocument, ConfigStore

pub mod config;
pub mod document;
pub mod store;

pub use config::{ConfigScene, ConfigWarning, Configuration};
pub use document::{ConfigDocument, RendererEntry, SceneEntry, TechniqueEntry};
pub use store::{ConfigStore, CURRENT_CONFIG_LINK};
