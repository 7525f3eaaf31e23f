//! Crux Core Library
//!
//! Provider configuration resolution and catalog synchronization for the
//! Crux coding assistant: which providers are usable, with which
//! credentials and endpoints, and which models fill the `large` and
//! `small` slots.

pub mod catalog;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use catalog::{Catalogs, CatalogOptions, ModelDescriptor, ProviderDescriptor, ProviderType};
pub use config::{
    Config, ConfigLoader, Environment, LoadedConfig, ProviderConfig, SelectedModel,
    SelectedModelType, load,
};
pub use error::{CruxError, CruxResult};
