pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{search_paths, ConfigError, LoadedConfig};
pub use model::{Config, DispatchConfig};
pub use validation::{ValidationError, ValidationErrors};
