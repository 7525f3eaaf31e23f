//! Configuration resolution
//!
//! Loading runs once per process: layered files are merged, the known
//! provider catalog is synchronized, providers are validated against the
//! environment and both model slots are filled. Later user actions mutate
//! the in-memory [`Config`] and write through to the data config file.

pub mod connection;
pub mod credentials;
pub mod env;
pub mod load;
pub mod loader;
pub mod model;
pub mod oauth;
pub mod persistence;
pub mod providers;
pub mod recent;
pub mod resolver;
pub mod selection;
pub mod shell;

pub use env::Environment;
pub use load::{ConfigLoader, LoadedConfig, load};
pub use loader::{ConfigPaths, merge_json};
pub use model::{Config, Options, ProviderConfig, SelectedModel, SelectedModelType};
pub use oauth::OAuthToken;
pub use persistence::{ConfigPersistence, ConfigUpdate};
pub use providers::{ConfigureContext, configure_providers};
pub use recent::{MAX_RECENT_MODELS, RecentModel};
pub use resolver::{EnvironmentVariableResolver, ResolveError, ShellVariableResolver, VariableResolver};
pub use selection::{configure_selected_models, default_model_selection};
pub use shell::{CommandExecutor, CommandOutput, SystemShell};
